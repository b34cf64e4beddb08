//! Durable object storage for persisted media.
//!
//! Keys look like `{owner_id}/{post_id}/{index}.jpg`, with a `-thumb`
//! suffix for video poster frames. Writes overwrite, so re-persisting the
//! same post is safe.

mod http;
mod memory;

pub use http::HttpObjectStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bucket not found: {0}")]
    BucketMissing(String),

    #[error("storage rejected upload (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("storage network error: {0}")]
    Network(String),
}

impl StorageError {
    /// Missing buckets are configuration errors; retrying won't fix them.
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::BucketMissing(_) => false,
            StorageError::Rejected { status, .. } => *status >= 500 || *status == 429,
            StorageError::Network(_) => true,
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Network(err.to_string())
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    pub overwrite: bool,
}

impl UploadOptions {
    pub fn jpeg() -> Self {
        Self {
            content_type: "image/jpeg".into(),
            overwrite: true,
        }
    }
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        options: &UploadOptions,
    ) -> StorageResult<()>;

    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Deterministic key for the media at `index` of a post.
pub fn media_key(owner_id: &str, post_id: &str, index: usize, thumbnail: bool) -> String {
    let suffix = if thumbnail { "-thumb" } else { "" };
    format!("{}/{}/{}{}.jpg", owner_id, post_id, index, suffix)
}

/// Connection settings for the storage service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL of the storage service, e.g. `https://project.supabase.co`
    pub base_url: String,

    /// Service key; falls back to `CAROUSEL_VAULT_STORAGE_KEY`
    pub service_key: Option<String>,
}

impl StorageConfig {
    pub const KEY_ENV: &'static str = "CAROUSEL_VAULT_STORAGE_KEY";

    pub fn resolved_key(&self) -> Option<String> {
        self.service_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(Self::KEY_ENV).ok())
    }
}
