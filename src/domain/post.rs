use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{Result, VaultError};

/// Path prefixes that precede a shortcode in a post URL.
const POST_PATH_KINDS: &[(&str, PostKind)] = &[
    ("p", PostKind::Post),
    ("reel", PostKind::Reel),
    ("reels", PostKind::Reel),
    ("tv", PostKind::Tv),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Post,
    Reel,
    Tv,
}

impl PostKind {
    fn path_segment(&self) -> &'static str {
        match self {
            PostKind::Post => "p",
            PostKind::Reel => "reel",
            PostKind::Tv => "tv",
        }
    }
}

/// A post identified by its shortcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    pub shortcode: String,
    pub kind: PostKind,
}

impl PostRef {
    /// Parse a post, reel or tv URL into its shortcode.
    ///
    /// Profile pages, explore pages and foreign hosts are rejected with
    /// [`VaultError::InputParse`].
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input.trim())
            .map_err(|e| VaultError::InputParse(format!("{}: {}", input, e)))?;

        let host = url.host_str().unwrap_or_default();
        if host != "instagram.com" && !host.ends_with(".instagram.com") {
            return Err(VaultError::InputParse(format!(
                "{} is not an instagram.com URL",
                input
            )));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        // Either /{kind}/{code} or /{username}/{kind}/{code}
        for window in segments.windows(2).take(2) {
            let Some(kind) = POST_PATH_KINDS
                .iter()
                .find(|(prefix, _)| *prefix == window[0])
                .map(|(_, kind)| *kind)
            else {
                continue;
            };

            if is_shortcode(window[1]) {
                return Ok(Self {
                    shortcode: window[1].to_string(),
                    kind,
                });
            }
        }

        Err(VaultError::InputParse(format!(
            "no post shortcode in {}",
            input
        )))
    }

    /// Canonical post page, e.g. `https://www.instagram.com/p/ABC123/`.
    pub fn canonical_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}/",
            base_url.trim_end_matches('/'),
            self.kind.path_segment(),
            self.shortcode
        )
    }

    /// Embeddable view with caption markup.
    pub fn embed_url(&self, base_url: &str) -> String {
        format!(
            "{}/p/{}/embed/captioned/",
            base_url.trim_end_matches('/'),
            self.shortcode
        )
    }
}

fn is_shortcode(candidate: &str) -> bool {
    (5..=64).contains(&candidate.len())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
