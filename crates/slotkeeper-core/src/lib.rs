//! Slotkeeper Core Library
//!
//! This crate provides the configuration, error types, upload value types and
//! validation-metadata helpers shared by the storage backends and the file
//! slot manager.

pub mod config;
pub mod error;
pub mod filename;
pub mod upload;
pub mod validation;

// Re-export commonly used types
pub use config::{ManagerConfig, RenamePolicyKind, SlotSelection};
pub use error::{ConfigError, ErrorMetadata, LogLevel};
pub use filename::{compose_stored_name, sanitize_component};
pub use upload::{RawUpload, RecordContext};
pub use validation::{derive_slot_names, RuleKind, ValidationRule};
