//! Best-fit tile search by sum of absolute differences

use super::library::Tile;
use image::RgbImage;

/// Sum of absolute per-channel differences of two same-sized images.
pub fn sad(a: &RgbImage, b: &RgbImage) -> u64 {
    a.as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum()
}

/// Index of the tile whose small version is closest to `cell`.
/// Ties keep the earliest tile; `None` only for an empty slice.
pub fn best_fit(cell: &RgbImage, tiles: &[Tile]) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (i, tile) in tiles.iter().enumerate() {
        let diff = sad(cell, &tile.small);
        if best.map_or(true, |(_, d)| diff < d) {
            best = Some((i, diff));
        }
    }
    best.map(|(i, _)| i)
}
