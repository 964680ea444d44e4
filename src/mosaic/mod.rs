//! Mosaic assembler.
//!
//! Rebuilds a target picture out of a folder of tiles (typically the output
//! of a scrape run). The target is enlarged, cut into `tile_size` cells and
//! every full cell is replaced by the tile whose downscaled version differs
//! least from the downscaled cell. Cells crossing the right or bottom edge
//! keep the target's pixels.

pub mod library;
pub mod matcher;

use crate::{Error, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;
use library::Tile;
use rayon::prelude::*;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct MosaicConfig {
    /// Side of a pasted tile in pixels
    pub tile_size: u32,
    /// Divisor giving the side of the matching thumbnails
    pub match_res: u32,
    /// Scale factor applied to the target before cutting cells
    pub enlargement: u32,
    /// Worker threads for loading and matching
    pub jobs: usize,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            tile_size: 50,
            match_res: 5,
            enlargement: 8,
            jobs: num_cpus::get(),
        }
    }
}

impl MosaicConfig {
    pub fn small_size(&self) -> u32 {
        self.tile_size / self.match_res.max(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.match_res == 0 || self.small_size() == 0 {
            return Err(Error::Config(format!(
                "tile size {} with match resolution {} leaves no pixels to match on",
                self.tile_size, self.match_res
            )));
        }
        if self.enlargement == 0 {
            return Err(Error::Config("enlargement must be at least 1".into()));
        }
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".into()));
        }
        Ok(())
    }
}

/// Summary of an assembled mosaic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicReport {
    /// Dimensions of the target as decoded
    pub target_size: (u32, u32),
    /// Dimensions of the written mosaic
    pub mosaic_size: (u32, u32),
    pub tiles_loaded: usize,
    pub tiles_skipped: usize,
    /// Full cells replaced by a tile
    pub cells: usize,
}

/// Enlarge the target by `factor` in both axes.
pub fn enlarge(target: &RgbImage, factor: u32) -> Result<RgbImage> {
    let (w, h) = target.dimensions();
    let (nw, nh) = w
        .checked_mul(factor)
        .zip(h.checked_mul(factor))
        .ok_or_else(|| Error::Mosaic(format!("{}x{} enlarged by {} overflows", w, h, factor)))?;
    Ok(imageops::resize(target, nw, nh, FilterType::Lanczos3))
}

/// Top-left corners of every cell that fits entirely inside `width` x `height`.
pub fn full_cells(width: u32, height: u32, tile_size: u32) -> Vec<(u32, u32)> {
    let step = tile_size as usize;
    (0..height)
        .step_by(step)
        .filter(|y| y + tile_size <= height)
        .flat_map(|y| {
            (0..width)
                .step_by(step)
                .filter(move |x| x + tile_size <= width)
                .map(move |x| (x, y))
        })
        .collect()
}

/// Replace every full cell of `target` with its best tile.
///
/// Matching runs on the current rayon pool; pasting is sequential so the
/// output does not depend on the number of threads.
pub fn assemble(target: &RgbImage, tiles: &[Tile], config: &MosaicConfig) -> (RgbImage, usize) {
    let ts = config.tile_size;
    let small = config.small_size();
    let cells = full_cells(target.width(), target.height(), ts);

    let picks: Vec<(u32, u32, Option<usize>)> = cells
        .par_iter()
        .map(|&(x, y)| {
            let cell = imageops::crop_imm(target, x, y, ts, ts).to_image();
            let cell = imageops::resize(&cell, small, small, FilterType::Triangle);
            (x, y, matcher::best_fit(&cell, tiles))
        })
        .collect();

    let mut mosaic = target.clone();
    let mut replaced = 0;
    for (x, y, pick) in picks {
        if let Some(i) = pick {
            imageops::replace(&mut mosaic, &tiles[i].large, x as i64, y as i64);
            replaced += 1;
        }
    }
    (mosaic, replaced)
}

/// Load tiles and target, assemble, and return the mosaic without saving it.
pub fn build(target: &Path, tiles_dir: &Path, config: &MosaicConfig) -> Result<(RgbImage, MosaicReport)> {
    config.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
        .map_err(|e| Error::Mosaic(format!("Failed to start worker pool: {}", e)))?;

    pool.install(|| {
        let lib = library::load_library(tiles_dir, config)?;

        let img = image::open(target)
            .map_err(|e| Error::Decode(format!("Failed to load target image {}: {}", target.display(), e)))?
            .to_rgb8();
        let target_size = img.dimensions();
        log::info!("target image size: {} x {}", target_size.0, target_size.1);

        let enlarged = enlarge(&img, config.enlargement)?;
        let (mosaic, cells) = assemble(&enlarged, &lib.tiles, config);

        let report = MosaicReport {
            target_size,
            mosaic_size: mosaic.dimensions(),
            tiles_loaded: lib.tiles.len(),
            tiles_skipped: lib.skipped,
            cells,
        };
        Ok((mosaic, report))
    })
}

/// `build`, then write the mosaic to `output` (format from the extension).
pub fn run(target: &Path, tiles_dir: &Path, output: &Path, config: &MosaicConfig) -> Result<MosaicReport> {
    let (mosaic, report) = build(target, tiles_dir, config)?;
    mosaic
        .save(output)
        .map_err(|e| Error::Encode(format!("{}: {}", output.display(), e)))?;
    log::info!("mosaic {}x{} written to {}", report.mosaic_size.0, report.mosaic_size.1, output.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn full_cells_skip_partial_edges() {
        let cells = full_cells(25, 21, 10);
        assert_eq!(cells, vec![(0, 0), (10, 0), (0, 10), (10, 10)]);
        assert!(full_cells(9, 30, 10).is_empty());
    }

    #[test]
    fn enlarge_scales_both_axes() {
        let img = RgbImage::new(3, 2);
        assert_eq!(enlarge(&img, 4).unwrap().dimensions(), (12, 8));
        assert!(enlarge(&RgbImage::new(2, 2), u32::MAX).is_err());
    }

    #[test]
    fn default_jobs_follow_cpu_count() {
        let cfg = MosaicConfig::default();
        assert_eq!(cfg.jobs, num_cpus::get());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_configs() {
        let base = MosaicConfig { jobs: 1, ..Default::default() };
        assert!(base.validate().is_ok());
        assert!(MosaicConfig { match_res: 0, ..base.clone() }.validate().is_err());
        assert!(MosaicConfig { tile_size: 4, match_res: 5, ..base.clone() }.validate().is_err());
        assert!(MosaicConfig { enlargement: 0, ..base.clone() }.validate().is_err());
        assert!(MosaicConfig { jobs: 0, ..base }.validate().is_err());
    }

    #[test]
    fn assemble_pastes_matching_tiles() {
        let cfg = MosaicConfig { tile_size: 4, match_res: 2, enlargement: 1, jobs: 1 };
        let tile = |v: u8| Tile {
            path: Default::default(),
            large: RgbImage::from_pixel(4, 4, Rgb([v, v, v])),
            small: RgbImage::from_pixel(2, 2, Rgb([v, v, v])),
        };
        let tiles = vec![tile(0), tile(255)];

        // dark left half, bright right half, a red 2px strip that never fits a cell
        let target = RgbImage::from_fn(10, 4, |x, _| match x {
            0..=3 => Rgb([30, 30, 30]),
            4..=7 => Rgb([220, 220, 220]),
            _ => Rgb([255, 0, 0]),
        });

        let (mosaic, replaced) = assemble(&target, &tiles, &cfg);
        assert_eq!(replaced, 2);
        assert_eq!(mosaic.get_pixel(1, 1), &Rgb([0, 0, 0]));
        assert_eq!(mosaic.get_pixel(5, 2), &Rgb([255, 255, 255]));
        assert_eq!(mosaic.get_pixel(9, 3), &Rgb([255, 0, 0]));
    }
}
