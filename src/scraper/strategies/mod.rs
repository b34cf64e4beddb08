//! The three extraction techniques, in priority order:
//!
//! 1. [`EmbedStrategy`]: browser on the embeddable view
//! 2. [`DirectStrategy`]: stealth browser on the canonical post page
//! 3. [`StaticHtmlStrategy`]: plain HTTP fetch of the embed HTML

mod direct;
mod embed;
mod static_html;

pub use direct::DirectStrategy;
pub use embed::EmbedStrategy;
pub use static_html::{parse_embed_html, StaticHtmlStrategy};

use std::collections::HashSet;

use crate::domain::MediaItem;
use crate::scraper::capture::signature;

/// Turn deduplicated capture URLs into media items. A URL whose signature
/// matches a `<video poster>` is the poster frame of a video slide.
pub(crate) fn assemble_media(urls: Vec<String>, posters: &[String]) -> Vec<MediaItem> {
    let poster_signatures: HashSet<String> = posters.iter().map(|p| signature(p)).collect();

    urls.into_iter()
        .map(|url| {
            if poster_signatures.contains(&signature(&url)) {
                MediaItem::video(url.clone(), Some(url))
            } else {
                MediaItem::image(url)
            }
        })
        .collect()
}
