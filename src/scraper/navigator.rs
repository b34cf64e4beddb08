//! Carousel length detection and forward navigation.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::app::{Result, VaultError};
use crate::scraper::capture::ResponseCapture;
use crate::scraper::config::ScraperConfig;
use crate::scraper::selectors::CarouselSelectors;
use crate::scraper::session::BrowserSession;

/// Human-like randomized pause between clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Pacing {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            min: Duration::from_millis(config.click_delay_min_ms),
            max: Duration::from_millis(config.click_delay_max_ms),
        }
    }

    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn next_delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

/// What a carousel walk observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselWalk {
    pub detected_size: usize,
    pub clicks: usize,
}

pub struct CarouselNavigator<'a> {
    selectors: &'a CarouselSelectors,
    max_size: usize,
    visibility_timeout: Duration,
    pacing: Pacing,
}

impl<'a> CarouselNavigator<'a> {
    pub fn new(selectors: &'a CarouselSelectors, config: &ScraperConfig) -> Self {
        Self {
            selectors,
            max_size: config.max_carousel_size.max(1),
            visibility_timeout: config.click_visibility_timeout(),
            pacing: Pacing::from_config(config),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Detect the slide count, then click through the remaining slides.
    pub async fn walk(
        &self,
        session: &dyn BrowserSession,
        capture: &mut ResponseCapture,
    ) -> CarouselWalk {
        let detected_size = self.detect_size(session).await;
        let clicks = if detected_size > 1 {
            self.advance(session, detected_size, capture).await
        } else {
            0
        };
        CarouselWalk {
            detected_size,
            clicks,
        }
    }

    /// First match wins: dot indicators, a "next" control (length unknown,
    /// assume the maximum), slide list items, otherwise a single item.
    pub async fn detect_size(&self, session: &dyn BrowserSession) -> usize {
        let dots = first_count(session, &self.selectors.dots).await;
        if dots > 1 {
            debug!("Carousel size from {} dot indicators", dots);
            return dots.min(self.max_size);
        }

        if first_count(session, &self.selectors.next).await > 0 {
            debug!("Next control present, assuming up to {} slides", self.max_size);
            return self.max_size;
        }

        let items = first_count(session, &self.selectors.list_items).await;
        if items > 1 {
            debug!("Carousel size from {} list items", items);
            return items.min(self.max_size);
        }

        1
    }

    /// Click "next" up to `expected - 1` times. A control that stops being
    /// visible marks the end of the carousel. Returns the clicks made.
    pub async fn advance(
        &self,
        session: &dyn BrowserSession,
        expected: usize,
        capture: &mut ResponseCapture,
    ) -> usize {
        let target = expected.min(self.max_size).saturating_sub(1);
        let mut clicks = 0;

        while clicks < target {
            let selector = match self.visible_next(session).await {
                Ok(selector) => selector,
                Err(VaultError::ElementNotFound(reason)) => {
                    debug!("End of carousel reached after {} clicks: {}", clicks, reason);
                    break;
                }
                Err(e) => {
                    warn!("Carousel navigation stopped after {} clicks: {}", clicks, e);
                    break;
                }
            };

            match session.click(&selector).await {
                Ok(true) => clicks += 1,
                Ok(false) => break,
                Err(e) => {
                    warn!("Carousel click failed after {} clicks: {}", clicks, e);
                    break;
                }
            }

            capture.pump();
            tokio::time::sleep(self.pacing.next_delay()).await;
        }

        capture.pump();
        clicks
    }

    /// The first "next" variant that becomes visible in time.
    async fn visible_next(&self, session: &dyn BrowserSession) -> Result<String> {
        let variants = self.selectors.next.len().max(1) as u32;
        let per_variant = self.visibility_timeout / variants;

        for selector in &self.selectors.next {
            match session.wait_visible(selector, per_variant).await {
                Ok(true) => return Ok(selector.clone()),
                Ok(false) => {}
                Err(e) => debug!("Visibility check for {} failed: {}", selector, e),
            }
        }
        Err(VaultError::ElementNotFound(format!(
            "no visible next control among {} selectors",
            self.selectors.next.len()
        )))
    }
}

/// Count of the first selector variant with any match.
async fn first_count(session: &dyn BrowserSession, selectors: &[String]) -> usize {
    for selector in selectors {
        match session.count(selector).await {
            Ok(n) if n > 0 => return n,
            Ok(_) => {}
            Err(e) => debug!("Count for {} failed: {}", selector, e),
        }
    }
    0
}
