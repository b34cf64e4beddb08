//! Browserless fallback: the embed page ships its post data as escaped JSON
//! inside a `<script>` block, so a plain fetch plus regex is often enough.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::app::{Result, VaultError};
use crate::domain::{MediaItem, MediaType, PostRef, ScrapeResult};
use crate::fetcher::PageFetcher;
use crate::scraper::capture::signature;
use crate::scraper::config::ScraperConfig;
use crate::scraper::metadata::clean_embed_caption;
use crate::scraper::Strategy;

static RE_DISPLAY_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""display_url"\s*:\s*"([^"]+)""#).unwrap());

static RE_VIDEO_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""video_url"\s*:\s*"([^"]+)""#).unwrap());

static RE_IS_VIDEO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""is_video"\s*:\s*true"#).unwrap());

static RE_OWNER_USERNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""owner"\s*:\s*\{[^{}]*?"username"\s*:\s*"([^"]+)""#).unwrap()
});

static RE_USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""username"\s*:\s*"([^"]+)""#).unwrap());

static RE_USERNAME_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class="UsernameText"[^>]*>\s*([^<\s]+)\s*<"#).unwrap());

static RE_CAPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)"edge_media_to_caption"\s*:\s*\{\s*"edges"\s*:\s*\[\s*\{\s*"node"\s*:\s*\{\s*"text"\s*:\s*"(.*?)"\s*\}"#,
    )
    .unwrap()
});

static RE_EMBED_IMAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]*class="[^"]*EmbeddedMediaImage[^"]*"[^>]*>"#).unwrap()
});

static RE_SRC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\ssrc="([^"]+)""#).unwrap());

/// Fetches the embed page over plain HTTP with a link-preview user agent.
pub struct StaticHtmlStrategy {
    fetcher: Arc<dyn PageFetcher + Send + Sync>,
    config: Arc<ScraperConfig>,
}

impl StaticHtmlStrategy {
    pub fn new(fetcher: Arc<dyn PageFetcher + Send + Sync>, config: Arc<ScraperConfig>) -> Self {
        Self { fetcher, config }
    }
}

#[async_trait]
impl Strategy for StaticHtmlStrategy {
    fn name(&self) -> &'static str {
        "static_html"
    }

    async fn attempt(&self, post: &PostRef) -> Result<ScrapeResult> {
        let url = post.embed_url(&self.config.base_url);
        let html = self.fetcher.fetch_text(&url).await?;
        debug!("Fetched {} bytes of embed HTML for {}", html.len(), post.shortcode);

        let parsed = parse_embed_html(&html);
        if parsed.media.is_empty() {
            return Err(VaultError::Parse(format!(
                "no media URLs in embed HTML for {}",
                post.shortcode
            )));
        }

        Ok(ScrapeResult::new(
            parsed.media,
            parsed.caption,
            parsed.author,
            self.config.max_carousel_size,
        ))
    }
}

/// What could be recovered from an embed page without a browser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedDocument {
    pub media: Vec<MediaItem>,
    pub author: String,
    pub caption: String,
}

/// Parse media, author and caption out of raw embed HTML.
pub fn parse_embed_html(html: &str) -> EmbedDocument {
    let text = unescape_embedded(html);

    let mut media = media_from_json(&text);
    if media.is_empty() {
        media = media_from_img_tags(html);
    }

    let author = RE_OWNER_USERNAME
        .captures(&text)
        .or_else(|| RE_USERNAME.captures(&text))
        .or_else(|| RE_USERNAME_TEXT.captures(html))
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    let caption = RE_CAPTION
        .captures(&text)
        .map(|c| clean_embed_caption(&c[1], ""))
        .unwrap_or_default();

    EmbedDocument {
        media,
        author,
        caption,
    }
}

/// `display_url` entries in document order. Each entry owns the text up to
/// the next `display_url`, which is where its `is_video` / `video_url` keys
/// live. Repeats collapse by signature; a repeat flagged as video upgrades
/// the earlier entry (sidecar parents repeat their first child).
fn media_from_json(text: &str) -> Vec<MediaItem> {
    let matches: Vec<_> = RE_DISPLAY_URL.captures_iter(text).collect();
    let mut media: Vec<MediaItem> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (i, captures) in matches.iter().enumerate() {
        let (Some(whole), Some(url)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        let node = &text[whole.end()..end];

        let display_url = url.as_str().to_string();
        let item = if RE_IS_VIDEO.is_match(node) {
            let video_url = RE_VIDEO_URL
                .captures(node)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| display_url.clone());
            MediaItem::video(video_url, Some(display_url.clone()))
        } else {
            MediaItem::image(display_url.clone())
        };

        match seen.get(&signature(&display_url)) {
            Some(&index) => {
                if item.media_type == MediaType::Video && !media[index].is_video() {
                    media[index] = item;
                }
            }
            None => {
                seen.insert(signature(&display_url), media.len());
                media.push(item);
            }
        }
    }

    media
}

fn media_from_img_tags(html: &str) -> Vec<MediaItem> {
    let mut seen = std::collections::HashSet::new();
    RE_EMBED_IMAGE_TAG
        .find_iter(html)
        .filter_map(|tag| RE_SRC.captures(tag.as_str()))
        .map(|c| html_escape::decode_html_entities(&c[1]).into_owned())
        .filter(|url| seen.insert(signature(url)))
        .map(MediaItem::image)
        .collect()
}

/// Undo the JSON-in-JS-string escaping of the embed payload. A second pass
/// runs only for a double-escaped payload, recognizable by an escaped slash
/// that survives the first pass.
pub(crate) fn unescape_embedded(input: &str) -> String {
    let once = unescape_once(input);
    if once.contains("\\/") {
        unescape_once(&once)
    } else {
        once
    }
}

fn unescape_once(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('/') => {
                chars.next();
                out.push('/');
            }
            Some('"') => {
                chars.next();
                out.push('"');
            }
            Some('\\') => {
                chars.next();
                out.push('\\');
            }
            Some('n') => {
                chars.next();
                out.push('\n');
            }
            Some('u') => {
                let hex: String = chars.clone().skip(1).take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        for _ in 0..5 {
                            chars.next();
                        }
                        out.push(decoded);
                    }
                    _ => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }

    out
}
