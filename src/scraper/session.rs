//! The browser capabilities the strategies rely on.
//!
//! A [`SessionProvider`] hands out one [`BrowserSession`] per scrape call
//! together with the receiving end of its response channel. The session is
//! owned exclusively by that call and must be closed on every exit path;
//! implementations also release their resources on drop.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::app::Result;
use crate::scraper::capture::CapturedResponse;

#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate and wait for the load event, bounded by `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Number of elements matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Poll until the first match of `selector` is visible. `Ok(false)` when
    /// it never shows up within `timeout`.
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Click the first match. `Ok(false)` when nothing matches.
    async fn click(&self, selector: &str) -> Result<bool>;

    /// Rendered text of the first match.
    async fn text(&self, selector: &str) -> Result<Option<String>>;

    /// Attribute values of every match, skipping elements without it.
    async fn attributes(&self, selector: &str, attribute: &str) -> Result<Vec<String>>;

    /// Tear the session down. Errors are logged, not returned.
    async fn close(self: Box<Self>);
}

/// A freshly opened session and the stream of responses it observes.
pub struct OpenedSession {
    pub session: Box<dyn BrowserSession>,
    pub responses: mpsc::Receiver<CapturedResponse>,
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open(&self) -> Result<OpenedSession>;
}

/// First value of `attribute` across a list of selector variants.
pub async fn first_attribute(
    session: &dyn BrowserSession,
    selectors: &[String],
    attribute: &str,
) -> Option<String> {
    for selector in selectors {
        if let Ok(values) = session.attributes(selector, attribute).await {
            if let Some(value) = values.into_iter().find(|v| !v.trim().is_empty()) {
                return Some(value);
            }
        }
    }
    None
}

/// First non-empty text across a list of selector variants.
pub async fn first_text(session: &dyn BrowserSession, selectors: &[String]) -> Option<String> {
    for selector in selectors {
        if let Ok(Some(text)) = session.text(selector).await {
            if !text.trim().is_empty() {
                return Some(text);
            }
        }
    }
    None
}
