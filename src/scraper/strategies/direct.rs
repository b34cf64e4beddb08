use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::app::{Result, VaultError};
use crate::domain::{PostRef, ScrapeResult};
use crate::scraper::capture::ResponseCapture;
use crate::scraper::config::ScraperConfig;
use crate::scraper::metadata;
use crate::scraper::navigator::{CarouselNavigator, Pacing};
use crate::scraper::session::{BrowserSession, OpenedSession, SessionProvider};
use crate::scraper::strategies::assemble_media;
use crate::scraper::Strategy;

const INTERSTITIAL_TIMEOUT: Duration = Duration::from_millis(500);

/// Stealth browser on the canonical post URL, the same path a logged-out
/// visitor would take.
pub struct DirectStrategy {
    sessions: Arc<dyn SessionProvider>,
    config: Arc<ScraperConfig>,
}

impl DirectStrategy {
    pub fn new(sessions: Arc<dyn SessionProvider>, config: Arc<ScraperConfig>) -> Self {
        Self { sessions, config }
    }

    async fn scrape(
        &self,
        session: &dyn BrowserSession,
        mut capture: ResponseCapture,
        post: &PostRef,
    ) -> Result<ScrapeResult> {
        let url = post.canonical_url(&self.config.base_url);
        session.navigate(&url, self.config.navigation_timeout()).await?;
        tokio::time::sleep(self.config.settle_after_load()).await;
        capture.pump();

        self.dismiss_interstitials(session).await;
        let login_walled = self.login_walled(session).await;

        let navigator = CarouselNavigator::new(&self.config.selectors.post, &self.config);
        let walk = navigator.walk(session, &mut capture).await;
        debug!(
            "Post carousel for {}: detected {} slides, {} clicks",
            post.shortcode, walk.detected_size, walk.clicks
        );

        let posters = session.attributes("video", "poster").await.unwrap_or_default();
        let meta = metadata::from_meta_tags(session, &self.config.selectors).await;
        let media = assemble_media(capture.finish(), &posters);

        if media.is_empty() && login_walled {
            return Err(VaultError::BotDetection(format!(
                "login wall shown for {}",
                post.shortcode
            )));
        }

        Ok(ScrapeResult::new(
            media,
            meta.caption,
            meta.author,
            self.config.max_carousel_size,
        ))
    }

    async fn dismiss_interstitials(&self, session: &dyn BrowserSession) {
        let pacing = Pacing::from_config(&self.config);
        for selector in &self.config.selectors.interstitials {
            if !matches!(session.wait_visible(selector, INTERSTITIAL_TIMEOUT).await, Ok(true)) {
                continue;
            }
            match session.click(selector).await {
                Ok(true) => {
                    debug!("Dismissed interstitial {}", selector);
                    tokio::time::sleep(pacing.next_delay()).await;
                }
                Ok(false) => {}
                Err(e) => warn!("Failed to dismiss {}: {}", selector, e),
            }
        }
    }

    async fn login_walled(&self, session: &dyn BrowserSession) -> bool {
        for selector in &self.config.selectors.login_wall {
            if matches!(session.count(selector).await, Ok(n) if n > 0) {
                debug!("Login wall marker {} present", selector);
                return true;
            }
        }
        false
    }
}

#[async_trait]
impl Strategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct_navigation"
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
