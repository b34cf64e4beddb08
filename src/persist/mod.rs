//! Media persistence: turn expiring CDN URLs into durable storage URLs.
//!
//! ```text
//! MediaItem → download (retry) → upload (overwrite) → public URL
//!                   ↘ on failure: keep the original CDN URL
//! ```
//!
//! Items are processed one at a time with a pause between them. A failed
//! item never aborts the batch; every input position produces an output URL.

mod config;

pub use config::PersistConfig;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::app::{Result, VaultError};
use crate::domain::{MediaItem, PersistResult};
use crate::fetcher::MediaDownloader;
use crate::retry::{retry, RetryPolicy};
use crate::storage::{media_key, ObjectStorage, UploadOptions};

pub struct MediaPersister {
    downloader: Arc<dyn MediaDownloader + Send + Sync>,
    storage: Arc<dyn ObjectStorage>,
    config: PersistConfig,
}

impl MediaPersister {
    pub fn new(
        downloader: Arc<dyn MediaDownloader + Send + Sync>,
        storage: Arc<dyn ObjectStorage>,
        config: PersistConfig,
    ) -> Self {
        Self {
            downloader,
            storage,
            config,
        }
    }

    /// Persist every item of a post. Always returns one URL per input item.
    pub async fn persist(
        &self,
        media: &[MediaItem],
        owner_id: &str,
        post_id: &str,
    ) -> PersistResult {
        let mut result = PersistResult::with_capacity(media.len());

        for (index, item) in media.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.item_delay()).await;
            }

            match self.persist_one(item, index, owner_id, post_id).await {
                Ok(stored_url) => {
                    result.push(item, stored_url);
                }
                Err(e) => {
                    if let VaultError::BucketMissing(ref bucket) = e {
                        error!(
                            "Storage bucket '{}' does not exist; check persist.bucket",
                            bucket
                        );
                    } else {
                        warn!("Keeping CDN URL for item {} of {}: {}", index, post_id, e);
                    }
                    result.push(item, item.url.clone());
                    result.push_error(format!("Item {}: {}", index, e));
                }
            }
        }

        info!(
            "Persisted {}/{} media items for {}/{}",
            media.len() - result.errors.len(),
            media.len(),
            owner_id,
            post_id
        );

        result
    }

    async fn persist_one(
        &self,
        item: &MediaItem,
        index: usize,
        owner_id: &str,
        post_id: &str,
    ) -> Result<String> {
        let policy = self.retry_policy();
        let fetch_url = item.fetch_url();

        let bytes = retry(
            policy,
            |_: &VaultError| true,
            |_| self.downloader.download(fetch_url),
        )
        .await?;

        let key = media_key(owner_id, post_id, index, item.is_video());
        let options = UploadOptions::jpeg();
        let bucket = self.config.bucket.as_str();

        retry(
            policy,
            |e: &crate::storage::StorageError| e.is_retryable(),
            |_| self.storage.upload(bucket, &key, bytes.clone(), &options),
        )
        .await?;

        Ok(self.storage.public_url(bucket, &key))
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.config.max_retries,
            self.config.backoff_base(),
            self.config.backoff_max(),
        )
    }
}
