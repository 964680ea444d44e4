//! Result page URLs and image tag extraction.

use crate::{Error, Result};
use scraper::{Html, Selector};
use url::Url;

/// Results per page on the search endpoint; drives the `first` offset.
pub const PAGE_SIZE: usize = 35;

/// Class carried by result thumbnails.
pub const IMAGE_CLASS: &str = "mimg";

const SEARCH_PATH: &str = "/images/search";
const FORM: &str = "HDRSC2";

/// Build the URL of result page `page` (zero-based).
///
/// ```
/// let url = tilescrape::search::page_url("https://www.bing.com", "black and white", 2).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://www.bing.com/images/search?q=black+and+white&first=70&form=HDRSC2"
/// );
/// ```
pub fn page_url(base: &str, query: &str, page: usize) -> Result<Url> {
    let mut url = Url::parse(base)
        .and_then(|b| b.join(SEARCH_PATH))
        .map_err(|e| Error::Config(format!("bad search base '{}': {}", base, e)))?;

    let first = page * PAGE_SIZE;
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("first", &first.to_string())
        .append_pair("form", FORM);
    Ok(url)
}

/// The two URL-bearing attributes of a result thumbnail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTag {
    pub src: Option<String>,
    pub data_src: Option<String>,
}

impl ImageTag {
    /// `src` wins when present and non-empty, otherwise `data-src`.
    /// `None` means the tag should be skipped.
    pub fn image_url(&self) -> Option<&str> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }
        non_empty(&self.src).or_else(|| non_empty(&self.data_src))
    }
}

/// Every `<img class="mimg">` of a result page, in document order.
pub fn extract_tags(html: &str) -> Vec<ImageTag> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("img.{}", IMAGE_CLASS)).expect("static selector");

    document
        .select(&selector)
        .map(|el| ImageTag {
            src: el.value().attr("src").map(str::to_string),
            data_src: el.value().attr("data-src").map(str::to_string),
        })
        .collect()
}

/// Resolve a possibly relative image URL against the page it came from.
pub fn resolve(page: &Url, raw: &str) -> Result<Url> {
    page.join(raw)
        .map_err(|e| Error::InvalidUrl(format!("'{}': {}", raw, e)))
}
