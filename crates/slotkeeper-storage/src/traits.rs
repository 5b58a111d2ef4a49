//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use bytes::Bytes;
use slotkeeper_core::{ErrorMetadata, LogLevel};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ErrorMetadata for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::WriteFailed(_) => "STORAGE_WRITE_FAILED",
            StorageError::ReadFailed(_) => "STORAGE_READ_FAILED",
            StorageError::DeleteFailed(_) => "STORAGE_DELETE_FAILED",
            StorageError::NotFound(_) => "NOT_FOUND",
            StorageError::InvalidKey(_) => "INVALID_FILE_NAME",
            StorageError::IoError(_) => "STORAGE_IO_ERROR",
            StorageError::ConfigError(_) => "STORAGE_CONFIGURATION_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::WriteFailed(_)
                | StorageError::ReadFailed(_)
                | StorageError::DeleteFailed(_)
                | StorageError::IoError(_)
        )
    }

    fn log_level(&self) -> LogLevel {
        match self {
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => LogLevel::Debug,
            _ => LogLevel::Error,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Reject names that are not a single, non-empty path component.
pub fn validate_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::InvalidKey("File name is empty".to_string()));
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "File name '{}' contains path separators or traversal",
            name
        )));
    }
    Ok(())
}

/// Storage abstraction trait
///
/// The file slot manager only talks to storage through this trait, so tests and
/// hosts can substitute their own backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the storage root if it does not exist yet.
    ///
    /// Idempotent: an already existing root is not an error.
    async fn ensure_root(&self) -> StorageResult<()>;

    /// Write data under `name`, creating or overwriting the file.
    async fn write(&self, name: &str, data: Bytes) -> StorageResult<()>;

    /// Read a stored file.
    async fn read(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Check if a file exists
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Delete a file if it exists.
    ///
    /// Returns `true` when a file was removed and `false` when nothing was
    /// stored under `name`.
    async fn delete(&self, name: &str) -> StorageResult<bool>;

    /// Human readable location of `name` (a path for filesystem backends).
    fn locate(&self, name: &str) -> String;

    /// Public URL of `name`, if the backend serves files over HTTP.
    fn public_url(&self, name: &str) -> Option<String>;
}
