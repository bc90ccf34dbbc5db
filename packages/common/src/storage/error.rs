use std::fmt;

/// Errors that can occur during object storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The requested object was not found.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The key is empty or would escape the store root.
    InvalidKey(String),
    /// The backend rejected our credentials or ACL.
    AccessDenied(String),
    /// Required settings (bucket, region, credentials) are missing or invalid.
    Misconfigured(String),
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "object not found: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidKey(key) => write!(f, "invalid object key: {key}"),
            Self::AccessDenied(msg) => write!(f, "storage access denied: {msg}"),
            Self::Misconfigured(msg) => write!(f, "storage misconfigured: {msg}"),
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::AccessDenied(err.to_string());
        }
        Self::Io(err)
    }
}
