use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Unrecognized post URL: {0}")]
    InputParse(String),

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Bot detection suspected: {0}")]
    BotDetection(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Storage bucket not found: {0}")]
    BucketMissing(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;

/// Coarse failure classes reported alongside strategy metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    InputParse,
    NavigationTimeout,
    ElementNotFound,
    BotDetectionSuspected,
    Browser,
    DownloadFailure,
    UploadFailure,
    BucketMissing,
    ParseError,
    NoMedia,
    Network,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InputParse => "input_parse",
            ErrorCategory::NavigationTimeout => "navigation_timeout",
            ErrorCategory::ElementNotFound => "element_not_found",
            ErrorCategory::BotDetectionSuspected => "bot_detection_suspected",
            ErrorCategory::Browser => "browser",
            ErrorCategory::DownloadFailure => "download_failure",
            ErrorCategory::UploadFailure => "upload_failure",
            ErrorCategory::BucketMissing => "bucket_missing",
            ErrorCategory::ParseError => "parse_error",
            ErrorCategory::NoMedia => "no_media",
            ErrorCategory::Network => "network",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VaultError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VaultError::InputParse(_) | VaultError::InvalidUrl(_) => ErrorCategory::InputParse,
            VaultError::NavigationTimeout { .. } => ErrorCategory::NavigationTimeout,
            VaultError::ElementNotFound(_) => ErrorCategory::ElementNotFound,
            VaultError::BotDetection(_) => ErrorCategory::BotDetectionSuspected,
            VaultError::Browser(_) => ErrorCategory::Browser,
            VaultError::Download { .. } => ErrorCategory::DownloadFailure,
            VaultError::Upload(_) => ErrorCategory::UploadFailure,
            VaultError::BucketMissing(_) => ErrorCategory::BucketMissing,
            VaultError::Parse(_) => ErrorCategory::ParseError,
            VaultError::Http(e) if e.is_timeout() => ErrorCategory::NavigationTimeout,
            VaultError::Http(_) => ErrorCategory::Network,
            VaultError::Io(_) | VaultError::Config(_) | VaultError::Other(_) => {
                ErrorCategory::Unknown
            }
        }
    }
}

impl From<StorageError> for VaultError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BucketMissing(bucket) => VaultError::BucketMissing(bucket),
            other => VaultError::Upload(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_follow_variants() {
        let timeout = VaultError::NavigationTimeout {
            url: "https://www.instagram.com/p/abc/".into(),
            timeout_ms: 1000,
        };
        assert_eq!(timeout.category(), ErrorCategory::NavigationTimeout);
        assert_eq!(
            VaultError::Parse("nothing".into()).category(),
            ErrorCategory::ParseError
        );
        assert_eq!(
            VaultError::BotDetection("login wall".into()).category(),
            ErrorCategory::BotDetectionSuspected
        );
    }

    #[test]
    fn test_storage_bucket_missing_is_preserved() {
        let err: VaultError = StorageError::BucketMissing("card-images".into()).into();
        assert!(matches!(err, VaultError::BucketMissing(ref b) if b == "card-images"));
        assert_eq!(err.category(), ErrorCategory::BucketMissing);

        let err: VaultError = StorageError::Rejected {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::UploadFailure);
    }

    #[test]
    fn test_category_labels_are_snake_case() {
        assert_eq!(
            ErrorCategory::BotDetectionSuspected.to_string(),
            "bot_detection_suspected"
        );
        let json = serde_json::to_string(&ErrorCategory::NoMedia).unwrap();
        assert_eq!(json, "\"no_media\"");
    }
}
