//! Tile library: loads a folder of tiles into large/small square pairs

use super::MosaicConfig;
use crate::{Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// One usable tile at both resolutions
#[derive(Debug, Clone)]
pub struct Tile {
    pub path: PathBuf,
    /// `tile_size` square pasted into the mosaic
    pub large: RgbImage,
    /// `small_size` square used for matching
    pub small: RgbImage,
}

#[derive(Debug, Clone)]
pub struct Library {
    pub tiles: Vec<Tile>,
    /// Candidate files that failed to decode
    pub skipped: usize,
}

/// Largest centered square of `img`.
pub fn center_crop(img: &RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let side = w.min(h);
    imageops::crop_imm(img, (w - side) / 2, (h - side) / 2, side, side).to_image()
}

pub fn prepare_tile(path: PathBuf, img: &DynamicImage, config: &MosaicConfig) -> Tile {
    let square = center_crop(&img.to_rgb8());
    let small_size = config.small_size();
    Tile {
        path,
        large: imageops::resize(&square, config.tile_size, config.tile_size, FilterType::Lanczos3),
        small: imageops::resize(&square, small_size, small_size, FilterType::Lanczos3),
    }
}

/// Files whose name mentions `.jpg` or `.png`, sorted by name.
pub fn tile_candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::Mosaic(format!("Could not open directory {}: {}", dir.display(), e)))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if (name.contains(".jpg") || name.contains(".png")) && entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Decode and prepare every candidate in `dir` on the current rayon pool.
pub fn load_library(dir: &Path, config: &MosaicConfig) -> Result<Library> {
    let candidates = tile_candidates(dir)?;

    let loaded: Vec<Option<Tile>> = candidates
        .into_par_iter()
        .map(|path| match image::open(&path) {
            Ok(img) => Some(prepare_tile(path, &img, config)),
            Err(e) => {
                log::warn!("skipping tile {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    let skipped = loaded.iter().filter(|t| t.is_none()).count();
    let tiles: Vec<Tile> = loaded.into_iter().flatten().collect();
    if tiles.is_empty() {
        return Err(Error::Mosaic(format!("No tiles found in {}", dir.display())));
    }

    log::info!("loaded {} tiles from {} ({} skipped)", tiles.len(), dir.display(), skipped);
    Ok(Library { tiles, skipped })
}
