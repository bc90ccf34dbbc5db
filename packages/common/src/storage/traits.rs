use async_trait::async_trait;

use super::error::StorageError;

/// Key-addressed public object storage for card covers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key` and return the public URL.
    ///
    /// Overwrites any existing object with the same key.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str)
    -> Result<String, StorageError>;

    /// Delete a single object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Public URL for `key`, whether or not it exists yet.
    fn public_url(&self, key: &str) -> String;
}
