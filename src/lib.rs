//! # carousel-vault
//!
//! Extracts every slide of a public Instagram carousel and copies the media
//! into durable object storage before the CDN links expire.
//!
//! ## Architecture
//!
//! ```text
//! URL → CarouselExtractor → ScrapeResult → MediaPersister → PersistResult
//!          │                                   │
//!          ├─ embed view (Chrome)              ├─ download with retry
//!          ├─ post page (Chrome, stealth)      └─ upload with overwrite
//!          └─ static embed HTML
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Print the slides of a post
//! carousel-vault extract https://www.instagram.com/p/ABC123/
//!
//! # Extract and archive under user-1/ABC123/{index}.jpg
//! carousel-vault archive https://www.instagram.com/p/ABC123/ --owner user-1
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: Post references, media items, results
//! - [`fetcher`]: Plain HTTP page fetching and media downloads
//! - [`persist`]: Download/upload pipeline
//! - [`retry`]: Exponential backoff helper
//! - [`scraper`]: Carousel extraction strategies
//! - [`storage`]: Object storage backends

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the extractor,
/// its strategies and the persistence pipeline.
pub mod app;

/// Command-line interface using clap.
///
/// - `extract <url> [--json]` - Print the slides of a post
/// - `archive <url> --owner <id> [--post <id>]` - Extract and persist
pub mod cli;

/// Configuration loaded from `~/.config/carousel-vault/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`PostRef`](domain::PostRef): Shortcode parsed from a post URL
/// - [`MediaItem`](domain::MediaItem): One slide, image or video
/// - [`ScrapeResult`](domain::ScrapeResult) / [`PersistResult`](domain::PersistResult)
pub mod domain;

/// HTTP fetching without a browser.
pub mod fetcher;

/// Media persistence with per-item fallback to the CDN URL.
pub mod persist;

pub mod retry;

/// Carousel extraction.
///
/// Uses headless Chrome via chromiumoxide and network response capture,
/// with a plain HTTP fallback.
///
/// - [`CarouselExtractor`](scraper::CarouselExtractor): Strategy orchestrator
/// - [`Strategy`](scraper::Strategy): Async trait for extraction techniques
/// - [`ScraperConfig`](scraper::ScraperConfig): Configuration options
pub mod scraper;

/// Object storage: an HTTP storage service and an in-memory backend.
pub mod storage;
