use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::debug;

use super::error::StorageError;
use super::traits::ObjectStore;
use super::{COVER_CACHE_CONTROL, validate_key};
use crate::config::StorageConfig;

/// S3-compatible object store (AWS, MinIO, R2, Supabase storage).
///
/// Uploads are public-read with a one-year immutable cache policy.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    /// Copy of `bucket` carrying the ACL and cache headers sent on uploads.
    upload_bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::Misconfigured("storage.bucket is not set".into()));
        }
        let (Some(access_key), Some(secret_key)) = (
            config.access_key_id.as_deref().filter(|s| !s.is_empty()),
            config.secret_access_key.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(StorageError::Misconfigured(
                "storage.access_key_id and storage.secret_access_key are required".into(),
            ));
        };

        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Misconfigured(format!("invalid credentials: {e}")))?;

        let region = match config.endpoint.as_deref().filter(|s| !s.is_empty()) {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Misconfigured(format!("invalid region: {e}")))?,
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials).map_err(map_s3_error)?;
        if config.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        let mut upload_bucket = bucket.clone();
        upload_bucket.add_header("x-amz-acl", "public-read");
        upload_bucket.add_header("Cache-Control", COVER_CACHE_CONTROL);

        Ok(Self {
            bucket,
            upload_bucket,
            public_base_url: config.public_base_url(),
        })
    }
}

fn map_s3_error(err: S3Error) -> StorageError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("403") || lower.contains("accessdenied") || lower.contains("access denied") {
        StorageError::AccessDenied(msg)
    } else {
        StorageError::Backend(msg)
    }
}

fn check_status(status: u16, key: &str, body: &[u8]) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        403 => Err(StorageError::AccessDenied(format!(
            "{key}: {}",
            String::from_utf8_lossy(body)
        ))),
        404 => Err(StorageError::NotFound(key.to_string())),
        _ => Err(StorageError::Backend(format!(
            "{key}: HTTP {status}: {}",
            String::from_utf8_lossy(body)
        ))),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        validate_key(key)?;
        let response = self
            .upload_bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(map_s3_error)?;
        check_status(response.status_code(), key, response.as_slice())?;
        debug!(key, bytes = data.len(), "Uploaded object");
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        let response = self.bucket.delete_object(key).await.map_err(map_s3_error)?;
        match response.status_code() {
            404 => Ok(false),
            status => check_status(status, key, response.as_slice()).map(|_| true),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
