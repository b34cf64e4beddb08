//! Configuration management for carousel-vault.
//!
//! Configuration is read from `~/.config/carousel-vault/config.toml`.
//! If the file doesn't exist, a default configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persist::PersistConfig;
use crate::scraper::ScraperConfig;
use crate::storage::StorageConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub persist: PersistConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// A missing file is created with commented defaults. Missing fields
    /// fall back to their defaults; an unparsable file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/carousel-vault/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("carousel-vault").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# carousel-vault configuration
#
# Selector lists ([scraper.selectors.*]) are omitted here; the built-in
# defaults apply unless you override them.

[scraper]
base_url = "https://www.instagram.com"

# Run Chrome without a visible window
headless = true

# Upper bound on slides per post
max_carousel_size = 20

# Page navigation timeout (milliseconds)
navigation_timeout_ms = 30000

# Hard limit for one whole strategy (seconds)
strategy_timeout_secs = 90

# How long to wait for the "next" control to become visible (milliseconds)
click_visibility_timeout_ms = 3000

# Wait after load and after the last click so lazy images arrive (milliseconds)
settle_after_load_ms = 1500

# Randomized pause between carousel clicks (milliseconds)
click_delay_min_ms = 600
click_delay_max_ms = 1400

viewport_width = 1280
viewport_height = 900

# Timeout for the plain HTTP fallback (seconds)
static_timeout_secs = 15

[persist]
# Bucket receiving persisted media
bucket = "card-images"

# Attempts per download or upload, including the first
max_retries = 3

# Exponential backoff: base doubles per retry, capped at max (milliseconds)
backoff_base_ms = 1000
backoff_max_ms = 8000

# Per-attempt download timeout (seconds)
download_timeout_secs = 30

# Pause between items (milliseconds)
item_delay_ms = 500

[storage]
# Storage service root, e.g. "https://your-project.supabase.co"
base_url = ""

# Service key. Leave unset to read CAROUSEL_VAULT_STORAGE_KEY instead.
# service_key = ""
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config = toml::from_str(Config::default_config_content())
            .expect("Default config should be valid TOML");

        assert_eq!(config.scraper.max_carousel_size, 20);
        assert_eq!(config.persist.bucket, "card-images");
        assert_eq!(config.persist.max_retries, 3);
        assert!(config.storage.service_key.is_none());
        assert!(!config.scraper.selectors.embed.next.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[scraper]
max_carousel_size = 10

[persist]
bucket = "archive"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.scraper.max_carousel_size, 10);
        assert_eq!(config.persist.bucket, "archive");
        // Defaults elsewhere
        assert_eq!(config.scraper.navigation_timeout_ms, 30_000);
        assert_eq!(config.persist.item_delay_ms, 500);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.scraper.base_url, "https://www.instagram.com");
        assert!(config.storage.base_url.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\nbase_url = \"http://localhost:54321\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.storage.base_url, "http://localhost:54321");
    }

    #[test]
    fn test_load_from_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scraper\nheadless = maybe").unwrap();

        match Config::load_from(&path) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected parse error, got {:?}", other),
        }

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load_from(&missing), Err(ConfigError::Io { .. })));
    }
}
