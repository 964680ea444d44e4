//! Tile transformation: decode, grayscale, resize and JPEG save.

use crate::{Error, Result, TileSize};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, Luma};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Decode raw bytes in any format the `image` crate recognises.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))
}

/// ITU-R BT.601 luma in 16.16 fixed point; alpha is dropped.
pub fn to_luma_bt601(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([l as u8])
    })
}

/// Full per-image transform: bytes in, `size`-sized grayscale tile out.
pub fn transform(bytes: &[u8], size: TileSize, filter: FilterType) -> Result<GrayImage> {
    let img = decode(bytes)?;
    let gray = to_luma_bt601(&img);
    Ok(imageops::resize(&gray, size.width, size.height, filter))
}

/// `<dir>/tile_<n>.jpg`
pub fn tile_path(dir: &Path, n: usize) -> PathBuf {
    dir.join(format!("tile_{}.jpg", n))
}

pub fn save_jpeg(img: &GrayImage, path: &Path, quality: u8) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::L8)
        .map_err(|e| Error::Encode(format!("{}: {}", path.display(), e)))?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(img: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[test]
    fn luma_uses_bt601_weights() {
        let mut img = RgbImage::new(4, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(2, 0, Rgb([0, 0, 255]));
        img.put_pixel(3, 0, Rgb([255, 255, 255]));

        let gray = to_luma_bt601(&DynamicImage::ImageRgb8(img));
        let values: Vec<u8> = gray.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![76, 150, 29, 255]);
    }

    #[test]
    fn luma_ignores_alpha() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 0]));
        let gray = to_luma_bt601(&DynamicImage::ImageRgba8(img));
        // 10*0.299 + 20*0.587 + 30*0.114 = 18.15
        assert!(gray.pixels().all(|p| p.0[0] == 18));
    }

    #[test]
    fn transform_yields_exact_tile_size() {
        let src = RgbImage::from_fn(120, 37, |x, y| Rgb([(x * 2) as u8, (y * 5) as u8, 90]));
        let bytes = png_bytes(DynamicImage::ImageRgb8(src));

        let tile = transform(&bytes, TileSize { width: 50, height: 50 }, FilterType::CatmullRom)
            .expect("transform");
        assert_eq!(tile.dimensions(), (50, 50));
    }

    #[test]
    fn transform_rejects_garbage() {
        let err = transform(b"<html>not an image</html>", TileSize::default(), FilterType::Triangle)
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn saved_tile_reads_back_as_grayscale() {
        let dir = tempfile::tempdir().unwrap();
        let path = tile_path(dir.path(), 1);
        assert!(path.ends_with("tile_1.jpg"));

        let img = GrayImage::from_fn(20, 10, |x, _| Luma([(x * 10) as u8]));
        save_jpeg(&img, &path, 75).expect("save");

        let back = image::open(&path).expect("reopen");
        assert_eq!((back.width(), back.height()), (20, 10));
        assert!(matches!(back, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn save_into_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("tile_1.jpg");
        let err = save_jpeg(&GrayImage::new(2, 2), &path, 75).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
