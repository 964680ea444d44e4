//! tilescrape
//!
//! Scrapes image search result pages, downloads a bounded number of images,
//! converts them to grayscale, resizes them to a fixed tile size and writes
//! them to a folder as `tile_1.jpg`, `tile_2.jpg`, ...
//!
//! The tile folder can then be fed to the mosaic assembler (`mosaic`
//! feature, on by default) to rebuild a target picture out of tiles.
//!
//! # Example
//!
//! ```no_run
//! use tilescrape::{HttpFetcher, ScrapeConfig, TileSize};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScrapeConfig {
//!     query: "black and white texture".to_string(),
//!     max_images: 20,
//!     tile_size: TileSize { width: 32, height: 32 },
//!     ..Default::default()
//! };
//!
//! let fetcher = HttpFetcher::new(&config)?;
//! let report = tilescrape::run(&fetcher, &config)?;
//! println!("saved {} tiles", report.saved);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

pub use image::imageops::FilterType;

pub mod error;
pub use error::{Error, Result};

// Blocking HTTP client used for result pages and images
pub mod fetch;
pub use fetch::HttpFetcher;

// Result page URLs and <img> tag extraction
pub mod search;

// Decode / grayscale / resize / save
pub mod tile;

// The download loop
pub mod pipeline;
pub use pipeline::{run, ItemOutcome, ScrapeReport};

#[cfg(feature = "mosaic")]
pub mod mosaic;

/// Width and height of an output tile in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl Default for TileSize {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
        }
    }
}

/// Configuration for a scrape run
///
/// The defaults reproduce the classic setup: 200 tiles of 50x50 pixels for
/// the query "black and white texture", written to `./tiles`.
///
/// # Examples
///
/// ```
/// let cfg = tilescrape::ScrapeConfig::default();
/// assert_eq!(cfg.max_images, 200);
/// assert_eq!(cfg.user_agent, "Mozilla/5.0");
/// ```
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Search query, URL-encoded into every result page request
    pub query: String,
    /// Folder the tiles are written to (created if missing)
    pub output_dir: PathBuf,
    /// Upper bound on the number of tiles written
    pub max_images: usize,
    /// Dimensions every tile is resized to
    pub tile_size: TileSize,
    /// Number of result pages to scan
    pub pages: usize,
    /// Scheme and host of the image search endpoint
    pub search_base: String,
    /// User-Agent sent with result page requests
    pub user_agent: String,
    /// Timeout for result page requests (`None` waits forever)
    pub page_timeout: Option<Duration>,
    /// Timeout for each image request
    pub image_timeout: Duration,
    /// JPEG quality used when saving tiles (1..=100)
    pub jpeg_quality: u8,
    /// Resampling filter used for the resize step
    pub filter: FilterType,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            query: "black and white texture".to_string(),
            output_dir: PathBuf::from("tiles"),
            max_images: 200,
            tile_size: TileSize::default(),
            pages: 10,
            search_base: "https://www.bing.com".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            page_timeout: Some(Duration::from_secs(30)),
            image_timeout: Duration::from_secs(10),
            jpeg_quality: 75,
            filter: FilterType::CatmullRom,
        }
    }
}

impl ScrapeConfig {
    /// Check the values that would otherwise fail deep inside the loop
    pub fn validate(&self) -> Result<()> {
        if self.tile_size.width == 0 || self.tile_size.height == 0 {
            return Err(Error::Config(format!(
                "tile size must be non-zero, got {}x{}",
                self.tile_size.width, self.tile_size.height
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::Config(format!(
                "jpeg quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        url::Url::parse(&self.search_base)
            .map_err(|e| Error::Config(format!("bad search base '{}': {}", self.search_base, e)))?;
        Ok(())
    }
}

/// Source of result pages and image bytes
///
/// `HttpFetcher` is the real implementation; tests plug in their own to
/// count or script requests.
pub trait Fetcher {
    /// GET a result page and return its body as text
    fn get_text(&self, url: &str) -> Result<String>;

    /// GET an image and return the raw body
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
