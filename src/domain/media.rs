use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

/// One resolved carousel slide.
///
/// Video bytes are never scraped; a video slide carries its poster frame in
/// `thumbnail_url` when one was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl MediaItem {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            media_type: MediaType::Image,
            thumbnail_url: None,
        }
    }

    pub fn video(url: impl Into<String>, thumbnail_url: Option<String>) -> Self {
        Self {
            url: url.into(),
            media_type: MediaType::Video,
            thumbnail_url,
        }
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    /// The URL whose bytes get persisted: the poster for videos when known.
    pub fn fetch_url(&self) -> &str {
        match self.media_type {
            MediaType::Video => self.thumbnail_url.as_deref().unwrap_or(&self.url),
            MediaType::Image => &self.url,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub images: Vec<String>,
    pub media: Vec<MediaItem>,
    pub caption: String,
    pub author: String,
    pub slide_count: usize,
}

impl ScrapeResult {
    /// Build a result, truncating to `max_slides` so that
    /// `images`, `media` and `slide_count` always agree.
    pub fn new(
        mut media: Vec<MediaItem>,
        caption: impl Into<String>,
        author: impl Into<String>,
        max_slides: usize,
    ) -> Self {
        media.truncate(max_slides);
        let images = media.iter().map(|m| m.url.clone()).collect::<Vec<_>>();
        Self {
            slide_count: images.len(),
            images,
            media,
            caption: caption.into(),
            author: author.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn truncate(&mut self, max_slides: usize) {
        self.media.truncate(max_slides);
        self.images.truncate(max_slides);
        self.slide_count = self.images.len();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistResult {
    pub urls: Vec<String>,
    pub media_types: Vec<MediaType>,
    pub video_positions: Vec<usize>,
    pub original_cdn_urls: Vec<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl PersistResult {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            urls: Vec::with_capacity(capacity),
            media_types: Vec::with_capacity(capacity),
            video_positions: Vec::new(),
            original_cdn_urls: Vec::with_capacity(capacity),
            success: true,
            errors: Vec::new(),
        }
    }

    /// Append one position; every position lands in all parallel vectors.
    pub fn push(&mut self, item: &MediaItem, stored_url: String) {
        if item.is_video() {
            self.video_positions.push(self.urls.len());
        }
        self.urls.push(stored_url);
        self.media_types.push(item.media_type);
        self.original_cdn_urls.push(item.url.clone());
    }

    pub fn push_error(&mut self, error: String) {
        self.errors.push(error);
        self.success = false;
    }
}
