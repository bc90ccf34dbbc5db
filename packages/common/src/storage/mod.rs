mod error;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::path::PathBuf;
use std::sync::Arc;

pub use error::StorageError;
pub use traits::ObjectStore;

use crate::config::{StorageBackend, StorageConfig};

/// Content type of every generated cover.
pub const COVER_CONTENT_TYPE: &str = "image/png";

/// Cache-Control applied to uploaded covers. Keys are versioned, so they never change.
pub const COVER_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Object key for a card's cover at a given theme version.
///
/// Creation uses version 1; regeneration uses the current unix millis so the
/// new URL never collides with a cached one.
pub fn cover_key(card_id: &str, version: i64) -> String {
    format!("cards/{card_id}/cover-{version}.png")
}

/// Build the configured object store backend.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let public_base_url = config
                .public_base_url
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| filesystem::DEFAULT_PUBLIC_PATH.to_string());
            let store = filesystem::FilesystemObjectStore::new(
                PathBuf::from(&config.local_dir),
                public_base_url,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => Ok(Arc::new(s3::S3ObjectStore::from_config(config)?)),
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Misconfigured(
            "S3 backend requires the `object-storage` feature".into(),
        )),
    }
}

/// Reject keys that could escape the store root.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg == ".." || seg == ".")
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
