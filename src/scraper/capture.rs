//! Call-scoped capture of intercepted image responses and their dedup.
//!
//! The browser pushes [`CapturedResponse`]s into a bounded channel. A
//! [`ResponseCapture`] owned by one scrape call drains that channel between
//! awaits, stamps each accepted response with an arrival counter and later
//! collapses re-fetches of the same asset.

use std::collections::HashSet;

use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use crate::scraper::filter::is_carousel_media;

/// Capacity of the browser → scrape call channel.
pub const CAPTURE_CHANNEL_CAPACITY: usize = 1024;

/// Minimum length of a filename stem treated as a content-address token.
const SIGNATURE_MIN_LEN: usize = 21;

/// A network response as reported by the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    pub url: String,
    pub content_type: Option<String>,
}

impl CapturedResponse {
    pub fn new(url: impl Into<String>, content_type: Option<&str>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.map(String::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    /// Arrival order within one scrape call, not wall-clock time
    pub timestamp: u64,
    pub content_type: Option<String>,
}

/// Accumulates carousel-quality candidates for a single scrape call.
pub struct ResponseCapture {
    rx: mpsc::Receiver<CapturedResponse>,
    candidates: Vec<ImageCandidate>,
    next_timestamp: u64,
    rejected: usize,
}

impl ResponseCapture {
    pub fn new(rx: mpsc::Receiver<CapturedResponse>) -> Self {
        Self {
            rx,
            candidates: Vec::new(),
            next_timestamp: 0,
            rejected: 0,
        }
    }

    /// Move everything currently buffered in the channel into the log.
    /// Never waits.
    pub fn pump(&mut self) -> usize {
        let mut accepted = 0;
        while let Ok(response) = self.rx.try_recv() {
            if self.record(response) {
                accepted += 1;
            }
        }
        accepted
    }

    fn record(&mut self, response: CapturedResponse) -> bool {
        if !is_carousel_media(&response.url, response.content_type.as_deref()) {
            self.rejected += 1;
            return false;
        }

        self.candidates.push(ImageCandidate {
            url: response.url,
            timestamp: self.next_timestamp,
            content_type: response.content_type,
        });
        self.next_timestamp += 1;
        true
    }

    pub fn candidates(&self) -> &[ImageCandidate] {
        &self.candidates
    }

    /// Drain what is left in the channel and return unique URLs in arrival order.
    pub fn finish(mut self) -> Vec<String> {
        self.pump();
        debug!(
            "Captured {} candidate images ({} responses rejected)",
            self.candidates.len(),
            self.rejected
        );
        dedupe(self.candidates)
    }
}

/// Approximate content identity of a CDN URL.
///
/// Uses the first path segment whose stem is made of underscore-delimited
/// parts and is longer than 20 characters (e.g.
/// `434512345_1122334455667788_9988776655443322110_n`), so size and format
/// variants of one asset collapse. Falls back to the whole path.
pub fn signature(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };

    path.split('/')
        .map(|segment| segment.split('.').next().unwrap_or(segment))
        .find(|stem| stem.contains('_') && stem.len() >= SIGNATURE_MIN_LEN)
        .map(String::from)
        .unwrap_or(path)
}

/// Earliest arrival wins per signature; output is in arrival order.
pub fn dedupe(mut candidates: Vec<ImageCandidate>) -> Vec<String> {
    candidates.sort_by_key(|c| c.timestamp);

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(signature(&c.url)))
        .map(|c| c.url)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cdn(stem: &str, variant: &str) -> String {
        format!(
            "https://scontent-lhr8-1.cdninstagram.com/v/t51.2885-15/{}_n.jpg?stp={}",
            stem, variant
        )
    }

    fn candidate(url: &str, timestamp: u64) -> ImageCandidate {
        ImageCandidate {
            url: url.to_string(),
            timestamp,
            content_type: Some("image/jpeg".into()),
        }
    }

    const S1: &str = "434512345_1122334455667788_9988776655443322110";
    const S2: &str = "434599999_2233445566778899_1122334455667788990";

    #[test]
    fn test_signature_ignores_size_variants() {
        let a = cdn(S1, "dst-jpg_e35_p1080x1080");
        let b = cdn(S1, "dst-jpg_e35_p640x640");
        assert_eq!(signature(&a), signature(&b));
        assert_eq!(signature(&a), format!("{}_n", S1));
        assert_ne!(signature(&a), signature(&cdn(S2, "x")));
    }

    #[test]
    fn test_signature_collapses_format_variants() {
        let jpg = format!("https://scontent.cdninstagram.com/v/t51.2885-15/{}_n.jpg", S1);
        let webp = format!("https://scontent.cdninstagram.com/v/t51.2885-15/{}_n.webp", S1);
        assert_eq!(signature(&jpg), signature(&webp));
    }

    #[test]
    fn test_signature_falls_back_to_path() {
        assert_eq!(
            signature("https://cdn.example.com/images/short_name.jpg?x=1"),
            "/images/short_name.jpg"
        );
    }

    #[test]
    fn test_earliest_duplicate_wins_and_order_follows_arrival() {
        let a = cdn(S1, "a");
        let b = cdn(S2, "b");
        let c = cdn(S1, "c");
        let result = dedupe(vec![candidate(&a, 2), candidate(&b, 0), candidate(&c, 1)]);
        assert_eq!(result, vec![b, c]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let candidates = vec![
            candidate(&cdn(S1, "a"), 3),
            candidate(&cdn(S2, "b"), 1),
            candidate(&cdn(S1, "c"), 2),
            candidate(&cdn(S2, "d"), 0),
        ];
        let once = dedupe(candidates);
        let again = dedupe(
            once.iter()
                .enumerate()
                .map(|(i, url)| candidate(url, i as u64))
                .collect(),
        );
        assert_eq!(once, again);
    }

    #[tokio::test]
    async fn test_capture_filters_and_stamps_arrival_order() {
        let (tx, rx) = mpsc::channel(16);
        let mut capture = ResponseCapture::new(rx);

        tx.send(CapturedResponse::new(cdn(S2, "first"), Some("image/jpeg")))
            .await
            .unwrap();
        tx.send(CapturedResponse::new(
            "https://scontent.cdninstagram.com/v/t51.2885-19/avatar_123456789012345678901_n.jpg",
            Some("image/jpeg"),
        ))
        .await
        .unwrap();
        assert_eq!(capture.pump(), 1);

        tx.send(CapturedResponse::new(cdn(S1, "second"), Some("image/jpeg")))
            .await
            .unwrap();
        tx.send(CapturedResponse::new(cdn(S2, "refetch"), Some("image/jpeg")))
            .await
            .unwrap();
        capture.pump();

        let stamps: Vec<u64> = capture.candidates().iter().map(|c| c.timestamp).collect();
        assert_eq!(stamps, vec![0, 1, 2]);

        let urls = capture.finish();
        assert_eq!(urls, vec![cdn(S2, "first"), cdn(S1, "second")]);
    }
}
