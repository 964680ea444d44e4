#![cfg(feature = "mosaic")]

use image::{Rgb, RgbImage};
use std::path::Path;
use tilescrape::mosaic::{self, MosaicConfig};

fn write_tiles(dir: &Path) {
    // non-square on purpose; loading crops them
    RgbImage::from_pixel(30, 20, Rgb([0, 0, 0]))
        .save(dir.join("tile_1.png"))
        .unwrap();
    RgbImage::from_pixel(20, 40, Rgb([255, 255, 255]))
        .save(dir.join("tile_2.png"))
        .unwrap();
    std::fs::write(dir.join("readme.txt"), "not a tile").unwrap();
}

fn write_target(path: &Path) {
    RgbImage::from_fn(4, 2, |x, _| if x < 2 { Rgb([10, 10, 10]) } else { Rgb([240, 240, 240]) })
        .save(path)
        .unwrap();
}

fn cfg(jobs: usize) -> MosaicConfig {
    MosaicConfig {
        tile_size: 10,
        match_res: 5,
        enlargement: 5,
        jobs,
    }
}

#[test]
fn mosaic_replaces_cells_with_closest_tiles() {
    let tmp = tempfile::tempdir().unwrap();
    let tiles = tmp.path().join("tiles");
    std::fs::create_dir(&tiles).unwrap();
    write_tiles(&tiles);
    let target = tmp.path().join("target.png");
    write_target(&target);
    let output = tmp.path().join("out.png");

    let report = mosaic::run(&target, &tiles, &output, &cfg(2)).unwrap();
    assert_eq!(report.target_size, (4, 2));
    assert_eq!(report.mosaic_size, (20, 10));
    assert_eq!(report.tiles_loaded, 2);
    assert_eq!(report.cells, 2);

    let out = image::open(&output).unwrap().to_rgb8();
    assert_eq!(out.dimensions(), (20, 10));
    assert!(out.get_pixel(3, 5).0.iter().all(|&c| c <= 5));
    assert!(out.get_pixel(16, 5).0.iter().all(|&c| c >= 250));
}

#[test]
fn thread_count_does_not_change_output() {
    let tmp = tempfile::tempdir().unwrap();
    write_tiles(tmp.path());
    let target = tmp.path().join("target.png");
    write_target(&target);

    let (single, _) = mosaic::build(&target, tmp.path(), &cfg(1)).unwrap();
    let (multi, _) = mosaic::build(&target, tmp.path(), &cfg(4)).unwrap();
    assert_eq!(single.as_raw(), multi.as_raw());
}

#[test]
fn missing_inputs_are_errors() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("target.png");
    write_target(&target);

    // target.png itself is the only candidate tile, so use an empty folder
    let empty = tmp.path().join("empty");
    std::fs::create_dir(&empty).unwrap();
    assert!(mosaic::build(&target, &empty, &cfg(1)).is_err());

    write_tiles(&empty);
    assert!(mosaic::build(&tmp.path().join("nope.png"), &empty, &cfg(1)).is_err());
}
