use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::app::{ErrorCategory, Result, VaultError};
use crate::domain::{PostRef, ScrapeResult};
use crate::scraper::metrics::{MetricsRecorder, StrategyEvent};
use crate::scraper::Strategy;

pub const PLATFORM: &str = "instagram";

/// Runs the strategies in priority order and returns the first result
/// with at least one image.
pub struct CarouselExtractor {
    strategies: Vec<Arc<dyn Strategy>>,
    metrics: Arc<dyn MetricsRecorder>,
    strategy_timeout: Duration,
    max_slides: usize,
}

impl CarouselExtractor {
    pub fn new(
        strategies: Vec<Arc<dyn Strategy>>,
        metrics: Arc<dyn MetricsRecorder>,
        strategy_timeout: Duration,
        max_slides: usize,
    ) -> Self {
        Self {
            strategies,
            metrics,
            strategy_timeout,
            max_slides: max_slides.max(1),
        }
    }

    /// `Err` only for a URL that is not a recognizable post; every strategy
    /// failing is `Ok(None)`.
    pub async fn extract(&self, url: &str) -> Result<Option<ScrapeResult>> {
        let post = PostRef::parse(url)?;

        for strategy in &self.strategies {
            let name = strategy.name();
            let started = Instant::now();
            let outcome =
                tokio::time::timeout(self.strategy_timeout, strategy.attempt(&post)).await;
            let elapsed = started.elapsed();

            let category = match outcome {
                Ok(Ok(mut result)) if !result.is_empty() => {
                    self.metrics
                        .record(&StrategyEvent::success(PLATFORM, name, elapsed));
                    result.truncate(self.max_slides);
                    info!(
                        "Extracted {} slides from {} via {}",
                        result.slide_count, post.shortcode, name
                    );
                    return Ok(Some(result));
                }
                Ok(Ok(_)) => {
                    warn!("Strategy {} found no media for {}", name, post.shortcode);
                    ErrorCategory::NoMedia
                }
                Ok(Err(e)) => {
                    warn!("Strategy {} failed for {}: {}", name, post.shortcode, e);
                    e.category()
                }
                Err(_) => {
                    let e = VaultError::NavigationTimeout {
                        url: url.to_string(),
                        timeout_ms: self.strategy_timeout.as_millis() as u64,
                    };
                    warn!("Strategy {} abandoned for {}: {}", name, post.shortcode, e);
                    e.category()
                }
            };

            self.metrics
                .record(&StrategyEvent::failure(PLATFORM, name, elapsed, category));
        }

        warn!("All strategies failed for {}", post.shortcode);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaItem;
    use crate::scraper::metrics::MemoryMetrics;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Images(usize),
        Empty,
        Fail(fn() -> VaultError),
        Hang,
    }

    struct Stub {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl Stub {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Strategy for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn attempt(&self, _post: &PostRef) -> Result<ScrapeResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Images(n) => {
                    let media = (0..*n)
                        .map(|i| {
                            MediaItem::image(format!("https://scontent.cdninstagram.com/{}.jpg", i))
                        })
                        .collect();
                    Ok(ScrapeResult::new(media, "", "jane", usize::MAX))
                }
                Behavior::Empty => Ok(ScrapeResult::default()),
                Behavior::Fail(make) => Err(make()),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(ScrapeResult::default())
                }
            }
        }
    }

    fn extractor(
        strategies: Vec<Arc<dyn Strategy>>,
        metrics: Arc<MemoryMetrics>,
    ) -> CarouselExtractor {
        CarouselExtractor::new(strategies, metrics, Duration::from_millis(200), 20)
    }

    const URL: &str = "https://www.instagram.com/p/ABC123xyz/";

    #[tokio::test]
    async fn test_falls_through_to_first_success() {
        let embed = Stub::new(
            "embed_navigation",
            Behavior::Fail(|| VaultError::Browser("crash".into())),
        );
        let direct = Stub::new("direct_navigation", Behavior::Images(3));
        let fallback = Stub::new("static_html", Behavior::Images(1));
        let metrics = Arc::new(MemoryMetrics::new());

        let strategies: Vec<Arc<dyn Strategy>> =
            vec![embed.clone(), direct.clone(), fallback.clone()];
        let result = extractor(strategies, metrics.clone())
            .extract(URL)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.slide_count, 3);
        assert_eq!((embed.calls(), direct.calls(), fallback.calls()), (1, 1, 0));

        let events = metrics.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].strategy, "embed_navigation");
        assert_eq!(events[0].error_category, Some(ErrorCategory::Browser));
        assert_eq!(events[1].strategy, "direct_navigation");
        assert!(events[1].success);
        assert!(events.iter().all(|e| e.platform == "instagram"));
    }

    #[tokio::test]
    async fn test_empty_result_counts_as_no_media() {
        let embed = Stub::new("embed_navigation", Behavior::Empty);
        let fallback = Stub::new("static_html", Behavior::Images(2));
        let metrics = Arc::new(MemoryMetrics::new());

        let strategies: Vec<Arc<dyn Strategy>> = vec![embed, fallback];
        let result = extractor(strategies, metrics.clone())
            .extract(URL)
            .await
            .unwrap();

        assert_eq!(result.map(|r| r.images.len()), Some(2));
        assert_eq!(metrics.events()[0].error_category, Some(ErrorCategory::NoMedia));
    }

    #[tokio::test]
    async fn test_two_empty_results_reach_the_third_strategy() {
        let embed = Stub::new("embed_navigation", Behavior::Empty);
        let direct = Stub::new("direct_navigation", Behavior::Empty);
        let fallback = Stub::new("static_html", Behavior::Images(1));
        let metrics = Arc::new(MemoryMetrics::new());

        let strategies: Vec<Arc<dyn Strategy>> =
            vec![embed.clone(), direct.clone(), fallback.clone()];
        let result = extractor(strategies, metrics.clone())
            .extract(URL)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.slide_count, 1);
        assert_eq!((embed.calls(), direct.calls(), fallback.calls()), (1, 1, 1));

        let events = metrics.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].error_category, Some(ErrorCategory::NoMedia));
        assert_eq!(events[1].error_category, Some(ErrorCategory::NoMedia));
        assert!(events[2].success);
        assert_eq!(events[2].strategy, "static_html");
    }

    #[tokio::test]
    async fn test_second_strategy_success_skips_the_third() {
        let embed = Stub::new("embed_navigation", Behavior::Empty);
        let direct = Stub::new("direct_navigation", Behavior::Images(2));
        let fallback = Stub::new("static_html", Behavior::Images(1));
        let metrics = Arc::new(MemoryMetrics::new());

        let strategies: Vec<Arc<dyn Strategy>> =
            vec![embed.clone(), direct.clone(), fallback.clone()];
        let result = extractor(strategies, metrics.clone())
            .extract(URL)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.slide_count, 2);
        assert_eq!((embed.calls(), direct.calls(), fallback.calls()), (1, 1, 0));
        assert_eq!(metrics.events().len(), 2);
    }

    #[tokio::test]
    async fn test_all_failing_is_none_with_one_event_each() {
        let metrics = Arc::new(MemoryMetrics::new());
        let strategies: Vec<Arc<dyn Strategy>> = vec![
            Stub::new("embed_navigation", Behavior::Hang),
            Stub::new(
                "direct_navigation",
                Behavior::Fail(|| VaultError::BotDetection("login".into())),
            ),
            Stub::new(
                "static_html",
                Behavior::Fail(|| VaultError::Parse("nothing".into())),
            ),
        ];

        let result = extractor(strategies, metrics.clone()).extract(URL).await.unwrap();
        assert!(result.is_none());

        let categories: Vec<_> = metrics.events().iter().map(|e| e.error_category).collect();
        assert_eq!(
            categories,
            vec![
                Some(ErrorCategory::NavigationTimeout),
                Some(ErrorCategory::BotDetectionSuspected),
                Some(ErrorCategory::ParseError),
            ]
        );
    }

    #[tokio::test]
    async fn test_unrecognized_url_runs_nothing() {
        let embed = Stub::new("embed_navigation", Behavior::Images(1));
        let metrics = Arc::new(MemoryMetrics::new());

        let strategies: Vec<Arc<dyn Strategy>> = vec![embed.clone()];
        let err = extractor(strategies, metrics.clone())
            .extract("https://example.com/p/ABC123xyz/")
            .await
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::InputParse);
        assert_eq!(embed.calls(), 0);
        assert!(metrics.events().is_empty());
    }

    #[tokio::test]
    async fn test_slide_count_capped() {
        let embed = Stub::new("embed_navigation", Behavior::Images(30));
        let metrics = Arc::new(MemoryMetrics::new());

        let strategies: Vec<Arc<dyn Strategy>> = vec![embed];
        let result = extractor(strategies, metrics)
            .extract(URL)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.slide_count, 20);
        assert_eq!(result.images.len(), 20);
        assert_eq!(result.media.len(), 20);
    }
}
