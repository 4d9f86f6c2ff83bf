//! Storage abstraction trait

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file written by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Generated key, unique per upload.
    pub key: String,
    /// Location on disk that analyzers can read.
    pub path: PathBuf,
    /// Public URL the file is served under.
    pub url: String,
    pub size_bytes: usize,
}

/// Storage abstraction trait
///
/// Handlers only see this trait, so the backing store can be swapped in tests.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under a freshly generated key derived from the original
    /// filename.
    async fn store(&self, original_filename: &str, data: Bytes) -> StorageResult<StoredObject>;

    /// Delete a file by key. Deleting a missing file is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete every file last modified more than `max_age` ago.
    ///
    /// Returns the number of files removed.
    async fn purge_older_than(&self, max_age: Duration) -> StorageResult<usize>;
}
