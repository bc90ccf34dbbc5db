use serde::Deserialize;

/// Which object storage backend holds card covers.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Filesystem,
}

/// Object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Default: s3.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Custom endpoint for S3-compatible services. Enables path-style addressing.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Default: "us-east-1".
    #[serde(default = "default_region")]
    pub region: String,
    /// Default: "holiday-cards".
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Root directory for the filesystem backend. Default: "./data/covers".
    #[serde(default = "default_local_dir")]
    pub local_dir: String,
    /// Overrides the derived public URL prefix.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_region() -> String {
    "us-east-1".into()
}
fn default_bucket() -> String {
    "holiday-cards".into()
}
fn default_local_dir() -> String {
    "./data/covers".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            endpoint: None,
            region: default_region(),
            bucket: default_bucket(),
            access_key_id: None,
            secret_access_key: None,
            local_dir: default_local_dir(),
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// URL prefix under which object keys are publicly reachable.
    ///
    /// `{endpoint}/{bucket}` for custom endpoints, otherwise the AWS
    /// virtual-hosted form `https://{bucket}.s3.{region}.amazonaws.com`.
    pub fn public_base_url(&self) -> String {
        if let Some(base) = self.public_base_url.as_deref().filter(|s| !s.is_empty()) {
            return base.trim_end_matches('/').to_string();
        }
        match self.endpoint.as_deref().filter(|s| !s.is_empty()) {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}
