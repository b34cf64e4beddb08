use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::storage::{ObjectStorage, StorageError, StorageResult, UploadOptions};

/// In-process storage, mainly for tests and dry runs.
pub struct MemoryStorage {
    buckets: HashSet<String>,
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    fail_keys: HashSet<String>,
}

impl MemoryStorage {
    pub fn new<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            buckets: buckets.into_iter().map(Into::into).collect(),
            objects: Mutex::new(HashMap::new()),
            fail_keys: HashSet::new(),
        }
    }

    /// Make uploads to `key` fail with a server-side rejection.
    pub fn failing_on(mut self, key: impl Into<String>) -> Self {
        self.fail_keys.insert(key.into());
        self
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()?
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .map(|objects| {
                objects
                    .keys()
                    .filter(|(b, _)| b == bucket)
                    .map(|(_, k)| k.clone())
                    .collect()
            })
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        options: &UploadOptions,
    ) -> StorageResult<()> {
        if !self.buckets.contains(bucket) {
            return Err(StorageError::BucketMissing(bucket.to_string()));
        }
        if self.fail_keys.contains(key) {
            return Err(StorageError::Rejected {
                status: 400,
                message: format!("refusing {}", key),
            });
        }

        let mut objects = self
            .objects
            .lock()
            .map_err(|e| StorageError::Network(e.to_string()))?;
        let id = (bucket.to_string(), key.to_string());
        if objects.contains_key(&id) && !options.overwrite {
            return Err(StorageError::Rejected {
                status: 409,
                message: "The resource already exists".into(),
            });
        }
        objects.insert(id, data);
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("memory://{}/{}", bucket, key)
    }
}
