use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::app::Result;
use crate::domain::{PostRef, ScrapeResult};
use crate::scraper::capture::ResponseCapture;
use crate::scraper::config::ScraperConfig;
use crate::scraper::metadata;
use crate::scraper::navigator::CarouselNavigator;
use crate::scraper::session::{BrowserSession, OpenedSession, SessionProvider};
use crate::scraper::strategies::assemble_media;
use crate::scraper::Strategy;

/// Browser on `/p/{code}/embed/captioned/`, clicking through the embed's
/// own carousel while image responses are captured.
pub struct EmbedStrategy {
    sessions: Arc<dyn SessionProvider>,
    config: Arc<ScraperConfig>,
}

impl EmbedStrategy {
    pub fn new(sessions: Arc<dyn SessionProvider>, config: Arc<ScraperConfig>) -> Self {
        Self { sessions, config }
    }

    async fn scrape(
        &self,
        session: &dyn BrowserSession,
        mut capture: ResponseCapture,
        post: &PostRef,
    ) -> Result<ScrapeResult> {
        let url = post.embed_url(&self.config.base_url);
        session.navigate(&url, self.config.navigation_timeout()).await?;
        tokio::time::sleep(self.config.settle_after_load()).await;
        capture.pump();

        let navigator = CarouselNavigator::new(&self.config.selectors.embed, &self.config);
        let walk = navigator.walk(session, &mut capture).await;
        if walk.clicks > 0 {
            tokio::time::sleep(self.config.settle_after_load()).await;
        }
        debug!(
            "Embed carousel for {}: detected {} slides, {} clicks",
            post.shortcode, walk.detected_size, walk.clicks
        );

        let posters = session.attributes("video", "poster").await.unwrap_or_default();
        let meta = metadata::from_embed(session, &self.config.selectors).await;
        let media = assemble_media(capture.finish(), &posters);

        Ok(ScrapeResult::new(
            media,
            meta.caption,
            meta.author,
            self.config.max_carousel_size,
        ))
    }
}

#[async_trait]
impl Strategy for EmbedStrategy {
    fn name(&self) -> &'static str {
        "embed_navigation"
    }

    async fn attempt(&self, post: &PostRef) -> Result<ScrapeResult> {
        let OpenedSession { session, responses } = self.sessions.open().await?;
        let outcome = self
            .scrape(session.as_ref(), ResponseCapture::new(responses), post)
            .await;
        session.close().await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::VaultError;
    use crate::domain::MediaType;
    use crate::scraper::session::fake::{FakeProvider, Script};
    use std::sync::atomic::Ordering;

    const A: &str = "https://scontent.cdninstagram.com/v/t51.2885-15/111111111_2222222222222222_3333333333333333333_n.jpg?stp=a";
    const A_SMALL: &str = "https://scontent.cdninstagram.com/v/t51.2885-15/111111111_2222222222222222_3333333333333333333_n.jpg?stp=s640";
    const B: &str = "https://scontent.cdninstagram.com/v/t51.2885-15/444444444_5555555555555555_6666666666666666666_n.jpg";
    const C: &str = "https://scontent.cdninstagram.com/v/t51.2885-15/777777777_8888888888888888_9999999999999999999_n.jpg";
    const AVATAR: &str = "https://scontent.cdninstagram.com/v/t51.2885-19/000000000_1111111111111111_2222222222222222222_n.jpg";

    fn config() -> Arc<ScraperConfig> {
        Arc::new(ScraperConfig {
            base_url: "https://www.instagram.com".into(),
            settle_after_load_ms: 0,
            click_delay_min_ms: 0,
            click_delay_max_ms: 0,
            click_visibility_timeout_ms: 10,
            ..Default::default()
        })
    }

    fn post() -> PostRef {
        PostRef::parse("https://www.instagram.com/p/ABC123xyz/").unwrap()
    }

    #[tokio::test]
    async fn test_walks_embed_carousel_and_collects_unique_media() {
        let provider = Arc::new(FakeProvider::new(
            Script::default()
                .count(".EmbedSidecar .SidecarDots > span", 3)
                .visible("button[aria-label=\"Next\"]", 2)
                .on_navigate(&[AVATAR, A, A_SMALL])
                .on_click(&[B])
                .on_click(&[C, A])
                .attribute("video", "poster", &[C])
                .text(".UsernameText", "jane")
                .text(".Caption", "jane Three slides"),
        ));
        let strategy = EmbedStrategy::new(provider.clone(), config());

        let result = strategy.attempt(&post()).await.unwrap();

        assert_eq!(result.images, vec![A, B, C]);
        assert_eq!(result.slide_count, 3);
        assert_eq!(result.media[2].media_type, MediaType::Video);
        assert_eq!(result.author, "jane");
        assert_eq!(result.caption, "Three slides");
        assert_eq!(provider.clicks.load(Ordering::SeqCst), 2);
        assert!(provider.closed.load(Ordering::SeqCst));
        assert_eq!(
            provider.navigations.lock().unwrap().as_slice(),
            ["https://www.instagram.com/p/ABC123xyz/embed/captioned/"]
        );
    }

    #[tokio::test]
    async fn test_session_closed_when_navigation_fails() {
        let provider = Arc::new(FakeProvider::new(Script::default().failing_navigation()));
        let strategy = EmbedStrategy::new(provider.clone(), config());

        let err = strategy.attempt(&post()).await.unwrap_err();
        assert!(matches!(err, VaultError::NavigationTimeout { .. }));
        assert!(provider.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_result_capped_at_max_carousel_size() {
        let provider = Arc::new(FakeProvider::new(
            Script::default()
                .count(".EmbedSidecar .SidecarDots > span", 3)
                .visible("button[aria-label=\"Next\"]", 2)
                .on_navigate(&[A])
                .on_click(&[B])
                .on_click(&[C]),
        ));
        let config = Arc::new(ScraperConfig {
            max_carousel_size: 2,
            ..(*config()).clone()
        });
        let strategy = EmbedStrategy::new(provider, config);

        let result = strategy.attempt(&post()).await.unwrap();
        assert_eq!(result.slide_count, 2);
        assert_eq!(result.images, vec![A, B]);
    }
}
