use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scraper::selectors::SelectorConfig;

/// Configuration for carousel extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root used to build post and embed URLs
    pub base_url: String,

    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Upper bound on slides per post (default: 20)
    pub max_carousel_size: usize,

    /// Page navigation timeout in milliseconds (default: 30000)
    pub navigation_timeout_ms: u64,

    /// Hard limit for one whole strategy in seconds (default: 90)
    pub strategy_timeout_secs: u64,

    /// How long to wait for the "next" control to become visible (default: 3000)
    pub click_visibility_timeout_ms: u64,

    /// Wait after load and after the last click so lazy images arrive (default: 1500)
    pub settle_after_load_ms: u64,

    /// Randomized pause between carousel clicks, lower bound (default: 600)
    pub click_delay_min_ms: u64,

    /// Randomized pause between carousel clicks, upper bound (default: 1400)
    pub click_delay_max_ms: u64,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Desktop user agents; one is picked at random per browser session
    pub user_agents: Vec<String>,

    /// Crawler user agent for the plain HTTP fallback
    pub static_user_agent: String,

    /// Timeout for the plain HTTP fallback in seconds (default: 15)
    pub static_timeout_secs: u64,

    pub selectors: SelectorConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.instagram.com".to_string(),
            headless: true,
            max_carousel_size: 20,
            navigation_timeout_ms: 30_000,
            strategy_timeout_secs: 90,
            click_visibility_timeout_ms: 3000,
            settle_after_load_ms: 1500,
            click_delay_min_ms: 600,
            click_delay_max_ms: 1400,
            viewport_width: 1280,
            viewport_height: 900,
            user_agents: vec![
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                    .to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36"
                    .to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/17.4 Safari/605.1.15"
                    .to_string(),
            ],
            static_user_agent:
                "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)"
                    .to_string(),
            static_timeout_secs: 15,
            selectors: SelectorConfig::default(),
        }
    }
}

impl ScraperConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_secs(self.strategy_timeout_secs)
    }

    pub fn click_visibility_timeout(&self) -> Duration {
        Duration::from_millis(self.click_visibility_timeout_ms)
    }

    pub fn settle_after_load(&self) -> Duration {
        Duration::from_millis(self.settle_after_load_ms)
    }

    pub fn static_timeout(&self) -> Duration {
        Duration::from_secs(self.static_timeout_secs)
    }

    /// Pick a user agent for a new session; `None` keeps the browser default.
    pub fn pick_user_agent(&self) -> Option<String> {
        self.user_agents.choose(&mut rand::rng()).cloned()
    }

    /// Create a config optimized for speed (less reliable on slow connections)
    pub fn fast() -> Self {
        Self {
            navigation_timeout_ms: 15_000,
            strategy_timeout_secs: 45,
            click_visibility_timeout_ms: 1500,
            settle_after_load_ms: 700,
            click_delay_min_ms: 300,
            click_delay_max_ms: 700,
            ..Default::default()
        }
    }

    /// Create a config optimized for completeness (slower)
    pub fn thorough() -> Self {
        Self {
            navigation_timeout_ms: 60_000,
            strategy_timeout_secs: 180,
            click_visibility_timeout_ms: 5000,
            settle_after_load_ms: 3000,
            click_delay_min_ms: 1000,
            click_delay_max_ms: 2500,
            ..Default::default()
        }
    }
}
