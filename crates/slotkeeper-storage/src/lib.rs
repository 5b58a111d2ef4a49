//! Slotkeeper Storage Library
//!
//! This crate provides the storage abstraction the file slot manager writes
//! through, and its local filesystem implementation.
//!
//! # Stored names
//!
//! Every stored file is addressed by a single path component relative to the
//! storage root (e.g. `3f2a9c.png`). Names must not be empty and must not
//! contain `/`, `\` or `..`.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{validate_name, Storage, StorageError, StorageResult};
