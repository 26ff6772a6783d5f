use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("No saved state under key {key}")]
    NotFound { key: String },
}

impl SaveError {
    /// Whether the caller should fall back to defaults quietly (nothing saved yet)
    pub fn is_missing(&self) -> bool {
        matches!(self, SaveError::NotFound { .. })
    }
}
