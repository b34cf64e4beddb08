//! Caption and author extraction. Best effort: missing fields are empty
//! strings, never errors.

use std::sync::LazyLock;

use regex::Regex;

use crate::scraper::selectors::SelectorConfig;
use crate::scraper::session::{first_attribute, first_text, BrowserSession};

/// "Jane Doe (@jane) on Instagram: ..." / "jane on Instagram"
static RE_TITLE_AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*(.+?)\s+on\s+Instagram\b").unwrap());

static RE_HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(@([A-Za-z0-9._]+)\)").unwrap());

/// "1,234 likes, 56 comments - "
static RE_ENGAGEMENT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*[\d.,]+\s*[KkMm]?\s+likes?,\s*[\d.,]+\s*[KkMm]?\s+comments?\s*(?:-\s*)?")
        .unwrap()
});

/// "jane on March 1, 2024: "
static RE_POSTED_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._]+\s+on\s+[A-Z][a-z]+\s+\d{1,2},\s+\d{4}\s*:\s*").unwrap()
});

/// Trailing "View all 12 comments" in embed captions.
static RE_VIEW_ALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\s*view all [\d,.]+ comments?\s*$").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostMetadata {
    pub author: String,
    pub caption: String,
}

/// Author from an "X on Instagram" title, preferring an `(@handle)` inside X.
pub fn author_from_title(title: &str) -> String {
    let title = html_escape::decode_html_entities(title);
    let Some(captures) = RE_TITLE_AUTHOR.captures(&title) else {
        return String::new();
    };
    let name = captures[1].trim();

    if let Some(handle) = RE_HANDLE.captures(name) {
        return handle[1].to_string();
    }
    name.trim_start_matches('@').to_string()
}

/// Caption from a description, minus any "N likes, M comments - user on date:" prefix.
pub fn caption_from_description(description: &str) -> String {
    let decoded = html_escape::decode_html_entities(description);
    let Some(prefix) = RE_ENGAGEMENT_PREFIX.find(&decoded) else {
        return decoded.trim().to_string();
    };

    let rest = &decoded[prefix.end()..];
    let rest = match RE_POSTED_BY.find(rest) {
        Some(m) => &rest[m.end()..],
        None => rest,
    };

    strip_quotes(rest.trim()).to_string()
}

/// Embed captions start with the author's username and may end with a
/// "View all N comments" link.
pub fn clean_embed_caption(text: &str, author: &str) -> String {
    let mut caption = text.trim();
    if !author.is_empty() {
        if let Some(rest) = caption.strip_prefix(author) {
            caption = rest.trim_start();
        }
    }
    RE_VIEW_ALL.replace(caption, "").trim().to_string()
}

fn strip_quotes(text: &str) -> &str {
    let text = text.strip_suffix('.').filter(|t| t.ends_with('"')).unwrap_or(text);
    match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(inner) => inner.trim(),
        None => text,
    }
}

/// Metadata from `og:` / `twitter:` meta tags of the canonical post page.
pub async fn from_meta_tags(
    session: &dyn BrowserSession,
    selectors: &SelectorConfig,
) -> PostMetadata {
    let title = first_attribute(session, &selectors.meta_title, "content")
        .await
        .unwrap_or_default();
    let description = first_attribute(session, &selectors.meta_description, "content")
        .await
        .unwrap_or_default();

    PostMetadata {
        author: author_from_title(&title),
        caption: caption_from_description(&description),
    }
}

/// Metadata from the embed view's username and caption nodes.
pub async fn from_embed(
    session: &dyn BrowserSession,
    selectors: &SelectorConfig,
) -> PostMetadata {
    let author = first_text(session, &selectors.embed_author)
        .await
        .map(|a| a.trim().trim_start_matches('@').to_string())
        .unwrap_or_default();
    let caption = first_text(session, &selectors.embed_caption)
        .await
        .map(|c| clean_embed_caption(&c, &author))
        .unwrap_or_default();

    PostMetadata { author, caption }
}
