//! Blocking HTTP fetcher backed by `reqwest`.
//!
//! One client is shared by every request of a run. Result page requests carry
//! the configured User-Agent and page timeout; image requests carry only the
//! image timeout. Non-success statuses are turned into `Error::Http`.

use crate::{Error, Fetcher, Result, ScrapeConfig};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use std::time::Duration;

/// `Fetcher` implementation performing real HTTP GETs
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
    page_timeout: Option<Duration>,
    image_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        // Timeouts are applied per request, so the client itself has none.
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            page_timeout: config.page_timeout,
            image_timeout: config.image_timeout,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn get_text(&self, url: &str) -> Result<String> {
        log::debug!("GET page {}", url);
        let mut req = self.client.get(url).header(USER_AGENT, self.user_agent.as_str());
        if let Some(timeout) = self.page_timeout {
            req = req.timeout(timeout);
        }

        let res = req.send()?.error_for_status()?;
        res.text()
            .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET image {}", url);
        let res = self
            .client
            .get(url)
            .timeout(self.image_timeout)
            .send()?
            .error_for_status()?;

        let bytes = res
            .bytes()
            .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
