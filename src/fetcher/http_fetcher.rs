use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;

use crate::app::{Result, VaultError};
use crate::fetcher::{MediaDownloader, PageFetcher};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client that identifies itself with `user_agent` and aborts
    /// every request after `timeout`.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| VaultError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        response.error_for_status_ref()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl MediaDownloader for HttpFetcher {
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "image/avif,image/webp,image/*,*/*;q=0.8")
            .header(REFERER, "https://www.instagram.com/")
            .send()
            .await
            .map_err(|e| download_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VaultError::Download {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| download_error(url, &e))?
            .to_vec();

        if body.is_empty() {
            return Err(VaultError::Download {
                url: url.to_string(),
                reason: "empty body".into(),
            });
        }

        Ok(body)
    }
}

fn download_error(url: &str, err: &reqwest::Error) -> VaultError {
    let reason = if err.is_timeout() {
        "timed out".to_string()
    } else {
        err.to_string()
    };
    VaultError::Download {
        url: url.to_string(),
        reason,
    }
}
