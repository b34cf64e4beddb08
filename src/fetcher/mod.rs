pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

/// Plain GET of a text document, no browser involved.
#[async_trait]
pub trait PageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Single-attempt media download. Retrying is the caller's business.
#[async_trait]
pub trait MediaDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
