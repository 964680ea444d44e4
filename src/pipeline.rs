//! The download loop.
//!
//! Pages are scanned in order; each tag of a page is turned into one
//! `ItemOutcome`. The number of saved tiles is threaded through the loop as
//! a plain value and both loops stop as soon as it reaches
//! `ScrapeConfig::max_images`. Everything runs on the calling thread with at
//! most one request in flight.

use crate::search::{self, ImageTag};
use crate::{tile, Error, Fetcher, Result, ScrapeConfig};
use std::path::{Path, PathBuf};
use url::Url;

/// What happened to a single tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Tile written to this path
    Saved(PathBuf),
    /// Tag had no usable URL attribute
    SkippedNoUrl,
    /// Fetch, decode or save failed; carries the error text
    Failed(String),
}

/// Totals of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Tiles written; also the index of the last file
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Result pages fetched and parsed
    pub pages_scanned: usize,
    /// Result pages whose fetch failed and were passed over
    pub failed_pages: usize,
}

/// Events emitted while the loop runs
#[derive(Debug)]
pub enum Progress<'a> {
    PageStart { page: usize, pages: usize },
    PageFailed { page: usize, error: &'a Error },
    Saved { count: usize, max: usize, path: &'a Path },
    Skipped { page: usize, tag: usize },
    Failed { index: usize, reason: &'a str },
    Finished { report: &'a ScrapeReport, dir: &'a Path },
}

/// Console line for a `Progress` event; skipped items print nothing.
pub fn progress_line(event: &Progress<'_>) -> Option<String> {
    match event {
        Progress::PageStart { page, pages } => Some(format!("Scanning page {}/{}...", page + 1, pages)),
        Progress::PageFailed { page, error } => Some(format!("Failed to fetch page {}: {}", page + 1, error)),
        Progress::Saved { count, max, .. } => Some(format!("Downloaded {}/{}", count, max)),
        Progress::Skipped { .. } => None,
        Progress::Failed { index, reason } => Some(format!("Failed to download image {}: {}", index, reason)),
        Progress::Finished { dir, .. } => Some(format!("Images saved to '{}'", dir.display())),
    }
}

/// Prints `progress_line` to stdout, used by `run`.
pub fn print_progress(event: Progress<'_>) {
    if let Some(line) = progress_line(&event) {
        println!("{}", line);
    }
}

/// Run the whole pipeline, printing progress to stdout.
pub fn run<F: Fetcher>(fetcher: &F, config: &ScrapeConfig) -> Result<ScrapeReport> {
    run_with(fetcher, config, print_progress)
}

/// Run the whole pipeline, reporting progress to `on_progress`.
///
/// Only configuration errors and failure to create the output folder are
/// returned; page and item failures are reported and passed over.
pub fn run_with<F, P>(fetcher: &F, config: &ScrapeConfig, mut on_progress: P) -> Result<ScrapeReport>
where
    F: Fetcher,
    P: FnMut(Progress<'_>),
{
    config.validate()?;
    std::fs::create_dir_all(&config.output_dir)?;

    log::info!(
        "scraping up to {} tiles for '{}' across {} pages",
        config.max_images,
        config.query,
        config.pages
    );

    let mut report = ScrapeReport::default();

    for page in 0..config.pages {
        if report.saved >= config.max_images {
            break;
        }
        on_progress(Progress::PageStart {
            page,
            pages: config.pages,
        });

        let page_url = search::page_url(&config.search_base, &config.query, page)?;
        let tags = match fetch_tags(fetcher, &page_url) {
            Ok(tags) => tags,
            Err(error) => {
                log::warn!("page {} ({}) failed: {}", page + 1, page_url, error);
                report.failed_pages += 1;
                on_progress(Progress::PageFailed { page, error: &error });
                continue;
            }
        };
        report.pages_scanned += 1;
        log::debug!("page {} yielded {} tags", page + 1, tags.len());

        for (i, tag) in tags.iter().enumerate() {
            if report.saved >= config.max_images {
                break;
            }

            let index = report.saved + 1;
            match process_item(fetcher, config, &page_url, tag, index) {
                ItemOutcome::Saved(path) => {
                    report.saved = index;
                    on_progress(Progress::Saved {
                        count: report.saved,
                        max: config.max_images,
                        path: &path,
                    });
                }
                ItemOutcome::SkippedNoUrl => {
                    report.skipped += 1;
                    on_progress(Progress::Skipped { page, tag: i });
                }
                ItemOutcome::Failed(reason) => {
                    report.failed += 1;
                    on_progress(Progress::Failed {
                        index,
                        reason: &reason,
                    });
                }
            }
        }
    }

    log::info!(
        "done: {} saved, {} skipped, {} failed, {} pages scanned, {} pages failed",
        report.saved,
        report.skipped,
        report.failed,
        report.pages_scanned,
        report.failed_pages
    );
    on_progress(Progress::Finished {
        report: &report,
        dir: &config.output_dir,
    });
    Ok(report)
}

/// Fetch one result page and pull its image tags out.
pub fn fetch_tags<F: Fetcher>(fetcher: &F, page_url: &Url) -> Result<Vec<ImageTag>> {
    let html = fetcher.get_text(page_url.as_str())?;
    Ok(search::extract_tags(&html))
}

/// Handle one tag: resolve its URL, fetch, transform and save as `tile_<index>.jpg`.
///
/// Never returns an error; every failure is folded into `ItemOutcome::Failed`.
pub fn process_item<F: Fetcher>(
    fetcher: &F,
    config: &ScrapeConfig,
    page_url: &Url,
    tag: &ImageTag,
    index: usize,
) -> ItemOutcome {
    let Some(raw) = tag.image_url() else {
        return ItemOutcome::SkippedNoUrl;
    };

    let attempt = || -> Result<PathBuf> {
        let url = search::resolve(page_url, raw)?;
        let bytes = fetcher.get_bytes(url.as_str())?;
        let img = tile::transform(&bytes, config.tile_size, config.filter)?;
        let path = tile::tile_path(&config.output_dir, index);
        tile::save_jpeg(&img, &path, config.jpeg_quality)?;
        Ok(path)
    };

    match attempt() {
        Ok(path) => ItemOutcome::Saved(path),
        Err(e) => {
            log::debug!("item {} ({}) failed: {}", index, raw, e);
            ItemOutcome::Failed(e.to_string())
        }
    }
}
