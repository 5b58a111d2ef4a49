//! Error types module
//!
//! Configuration errors shared by every crate in the workspace, plus the
//! `ErrorMetadata` trait that lets callers decide how to report an error
//! without matching on every variant.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like caller misuse
    Debug,
    /// Warning level - for recoverable issues like failed cleanup
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be surfaced by a caller.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "CONFIGURATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether repeating the operation could succeed
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Errors raised while building or validating a manager configuration.
///
/// All of these are detected eagerly, before any ingest begins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid rename policy: {0}")]
    InvalidRenamePolicy(String),

    #[error("Malformed slot names: {0}")]
    MalformedSlotNames(String),

    #[error("Duplicate slot name: {0}")]
    DuplicateSlot(String),

    #[error("No file slots could be derived from validation metadata")]
    NoSlotsDerived,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Rename function failed: {0}")]
    RenameFault(String),
}

impl ErrorMetadata for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::RenameFault(_) => "RENAME_FAULT",
            _ => "CONFIGURATION_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}
