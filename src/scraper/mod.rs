//! Carousel extraction for Instagram posts.
//!
//! Public pages only show one slide at a time and load the rest lazily, so
//! the browser strategies click through the carousel while listening to the
//! network for image responses. A plain HTTP fallback parses the JSON that
//! the embed page inlines.
//!
//! # Architecture
//!
//! ```text
//! URL → PostRef → [embed | direct | static] → captured URLs → filter → dedupe → ScrapeResult
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use carousel_vault::scraper::{CarouselExtractor, ScraperConfig};
//!
//! let ctx = AppContext::new(Config::load()?)?;
//! if let Some(result) = ctx.extractor.extract("https://www.instagram.com/p/ABC123/").await? {
//!     println!("{} slides by {}", result.slide_count, result.author);
//! }
//! ```

pub mod capture;
mod chrome;
mod config;
pub mod filter;
pub mod metadata;
pub mod metrics;
pub mod navigator;
mod orchestrator;
mod selectors;
pub mod session;
pub mod strategies;

pub use capture::{dedupe, signature, CapturedResponse, ImageCandidate, ResponseCapture};
pub use chrome::{ChromeSession, ChromeSessionProvider};
pub use config::ScraperConfig;
pub use filter::is_carousel_media;
pub use metrics::{MemoryMetrics, MetricsRecorder, StrategyEvent, TracingMetrics};
pub use navigator::{CarouselNavigator, CarouselWalk, Pacing};
pub use orchestrator::{CarouselExtractor, PLATFORM};
pub use selectors::{CarouselSelectors, SelectorConfig};
pub use session::{BrowserSession, OpenedSession, SessionProvider};
pub use strategies::{DirectStrategy, EmbedStrategy, StaticHtmlStrategy};

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{PostRef, ScrapeResult};

/// One way of turning a post into its slides.
///
/// An attempt owns every resource it acquires and releases it before
/// returning, whatever the outcome.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Stable identifier used in metrics
    fn name(&self) -> &'static str;

    async fn attempt(&self, post: &PostRef) -> Result<ScrapeResult>;
}
