use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the download/upload pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    /// Storage bucket receiving persisted media (default: "card-images")
    pub bucket: String,

    /// Attempts per download or upload, including the first (default: 3)
    pub max_retries: u32,

    /// Backoff before the second attempt in milliseconds, doubled each time (default: 1000)
    pub backoff_base_ms: u64,

    /// Upper bound on a single backoff in milliseconds (default: 8000)
    pub backoff_max_ms: u64,

    /// Per-attempt download timeout in seconds (default: 30)
    pub download_timeout_secs: u64,

    /// Pause between items in milliseconds (default: 500)
    pub item_delay_ms: u64,

    /// User agent for media downloads
    pub user_agent: String,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            bucket: "card-images".to_string(),
            max_retries: 3,
            backoff_base_ms: 1000,
            backoff_max_ms: 8000,
            download_timeout_secs: 30,
            item_delay_ms: 500,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl PersistConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    /// No pauses at all; same retry count. Used by tests.
    pub fn immediate() -> Self {
        Self {
            backoff_base_ms: 0,
            backoff_max_ms: 0,
            item_delay_ms: 0,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = PersistConfig::default();
        assert_eq!(config.bucket, "card-images");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.download_timeout(), Duration::from_secs(30));
        assert_eq!(config.item_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_immediate_keeps_retry_count() {
        let config = PersistConfig::immediate();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.item_delay(), Duration::ZERO);
        assert_eq!(config.backoff_base(), Duration::ZERO);
    }
}
