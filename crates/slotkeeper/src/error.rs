use slotkeeper_core::{ConfigError, ErrorMetadata, LogLevel};
use slotkeeper_storage::StorageError;

/// Errors surfaced by the file slot manager.
///
/// Cleanup failures are not errors: they are reported inside
/// [`crate::CommitResult`] and [`crate::PurgeResult`].
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    /// The file was not written. The stored name computed by `prepare_ingest`
    /// may already have been persisted by the caller.
    #[error("Failed to write {name}: {source}")]
    StorageWrite {
        name: String,
        #[source]
        source: StorageError,
    },
}

impl ErrorMetadata for SlotError {
    fn error_code(&self) -> &'static str {
        match self {
            SlotError::Configuration(inner) => inner.error_code(),
            SlotError::UnknownSlot(_) => "UNKNOWN_SLOT",
            SlotError::StorageWrite { .. } => "STORAGE_WRITE_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            SlotError::StorageWrite { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            SlotError::UnknownSlot(_) => LogLevel::Debug,
            _ => LogLevel::Error,
        }
    }
}

pub type SlotResult<T> = Result<T, SlotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_write_metadata() {
        let err = SlotError::StorageWrite {
            name: "a.png".to_string(),
            source: StorageError::WriteFailed("disk full".to_string()),
        };
        assert_eq!(err.error_code(), "STORAGE_WRITE_ERROR");
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("a.png"));
    }

    #[test]
    fn test_configuration_metadata_passes_through() {
        let err = SlotError::from(ConfigError::RenameFault("boom".to_string()));
        assert_eq!(err.error_code(), "RENAME_FAULT");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_unknown_slot_metadata() {
        let err = SlotError::UnknownSlot("banner".to_string());
        assert_eq!(err.error_code(), "UNKNOWN_SLOT");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }
}
