//! Error types for the scraper and the mosaic assembler

use thiserror::Error;

/// Result type alias for tilescrape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scraping, transforming or assembling tiles
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Request could not be sent or its body could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// URL could not be parsed or resolved; no request was sent
    #[error("Invalid URL {0}")]
    InvalidUrl(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Image could not be encoded for writing
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Mosaic assembly failed
    #[error("Mosaic failed: {0}")]
    Mosaic(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match (err.status(), err.url()) {
            (Some(status), Some(url)) => Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            },
            _ => Error::Network(err.to_string()),
        }
    }
}
