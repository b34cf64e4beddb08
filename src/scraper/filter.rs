//! Classifies intercepted responses as carousel-quality media or noise.

use url::Url;

const MEDIA_HOSTS: &[&str] = &["cdninstagram.com", "fbcdn.net"];

/// Thumbnails, avatars, story frames and ad creatives.
const EXCLUDE_PATTERNS: &[&str] = &[
    "-19/",
    "/stories/",
    "story_",
    "s150x150",
    "s320x320",
    "p150x150",
    "p320x320",
    "_nc_ad=",
    "/rsrc.php",
    "static.cdninstagram.com",
];

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".heic"];

/// True only for full-size post media on the CDN.
pub fn is_carousel_media(url: &str, content_type: Option<&str>) -> bool {
    if let Some(ct) = content_type {
        if !ct.is_empty() && !ct.to_ascii_lowercase().starts_with("image/") {
            return false;
        }
    }

    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let host = parsed.host_str().unwrap_or_default();
    if !MEDIA_HOSTS.iter().any(|h| host == *h || host.ends_with(&format!(".{}", h))) {
        return false;
    }

    let lower = url.to_ascii_lowercase();
    if EXCLUDE_PATTERNS.iter().any(|p| lower.contains(p)) {
        return false;
    }

    let path = parsed.path().to_ascii_lowercase();
    has_media_path(&path) && IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Post media lives under a `t51.<n>-15` path segment.
fn has_media_path(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment
            .strip_prefix("t51.")
            .and_then(|rest| rest.strip_suffix("-15"))
            .is_some_and(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
    })
}
