use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use crate::app::{Result, VaultError};
use crate::storage::{ObjectStorage, StorageConfig, StorageError, StorageResult, UploadOptions};

/// Client for a Supabase-style storage REST API
/// (`/storage/v1/object/{bucket}/{key}`).
pub struct HttpObjectStorage {
    client: Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpObjectStorage {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VaultError::Config(format!("Failed to build storage client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(VaultError::Config("storage.base_url is not set".into()));
        }
        let key = config.resolved_key().ok_or_else(|| {
            VaultError::Config(format!(
                "storage.service_key is not set and {} is empty",
                StorageConfig::KEY_ENV
            ))
        })?;
        Self::new(&config.base_url, &key)
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, key)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        options: &UploadOptions,
    ) -> StorageResult<()> {
        let size = data.len();
        let resp = self
            .client
            .post(self.object_url(bucket, key))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(CONTENT_TYPE, &options.content_type)
            .header("x-upsert", if options.overwrite { "true" } else { "false" })
            .body(data)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(bucket, key, size_bytes = size, "Stored object");
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
        let message = body
            .as_ref()
            .and_then(|b| b.message.clone().or_else(|| b.error.clone()))
            .unwrap_or(text);

        if message.to_lowercase().contains("bucket not found") {
            return Err(StorageError::BucketMissing(bucket.to_string()));
        }

        Err(StorageError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_upload_posts_with_upsert() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/card-images/u/p/0.jpg"))
            .and(header("x-upsert", "true"))
            .and(header("authorization", "Bearer secret"))
            .and(header("content-type", "image/jpeg"))
            .and(body_bytes(vec![1u8, 2, 3]))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"Key":"card-images/u/p/0.jpg"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let storage = HttpObjectStorage::new(&server.uri(), "secret").unwrap();
        storage
            .upload("card-images", "u/p/0.jpg", vec![1, 2, 3], &UploadOptions::jpeg())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_bucket_not_found_is_distinguished() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"statusCode":"404","error":"Bucket not found","message":"Bucket not found"}"#,
            ))
            .mount(&server)
            .await;

        let storage = HttpObjectStorage::new(&server.uri(), "secret").unwrap();
        let err = storage
            .upload("missing", "u/p/0.jpg", vec![1], &UploadOptions::jpeg())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BucketMissing(ref b) if b == "missing"));
    }

    #[tokio::test]
    async fn test_other_rejections_carry_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let storage = HttpObjectStorage::new(&server.uri(), "secret").unwrap();
        let err = storage
            .upload("card-images", "k.jpg", vec![1], &UploadOptions::jpeg())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Rejected { status: 500, ref message } if message == "internal"
        ));
    }

    #[test]
    fn test_public_url() {
        let storage = HttpObjectStorage::new("https://proj.supabase.co/", "k").unwrap();
        assert_eq!(
            storage.public_url("card-images", "u/p/1-thumb.jpg"),
            "https://proj.supabase.co/storage/v1/object/public/card-images/u/p/1-thumb.jpg"
        );
    }

    #[test]
    fn test_from_config_requires_base_url() {
        let err = HttpObjectStorage::from_config(&StorageConfig::default()).err();
        assert!(matches!(err, Some(VaultError::Config(_))));
    }
}
