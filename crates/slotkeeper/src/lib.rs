//! Slotkeeper
//!
//! Names, stores and garbage-collects uploaded files in lockstep with the
//! create/update/delete lifecycle of the record that owns them.
//!
//! A caller drives four phases on a [`FileSlotManager`]:
//!
//! 1. [`FileSlotManager::capture_baseline`] after the record is loaded,
//! 2. [`FileSlotManager::prepare_ingest`] before the record is validated and saved,
//! 3. [`FileSlotManager::commit_ingest`] after the record was persisted,
//! 4. [`FileSlotManager::purge_all`] after the record was destroyed.
//!
//! Filenames travel in and out as plain mappings; the manager never touches
//! the record itself.

pub mod error;
pub mod manager;
pub mod policy;
pub mod result;
pub mod slot;

pub use error::{SlotError, SlotResult};
pub use manager::{FileSlotManager, ManagerBuilder};
pub use policy::{slugify, RenamePolicy};
pub use result::{CleanupFailure, CommitResult, PurgeOutcome, PurgeResult, SlotPurge};
pub use slot::Slot;

pub use slotkeeper_core::{
    ConfigError, ManagerConfig, RawUpload, RecordContext, RenamePolicyKind, RuleKind,
    SlotSelection, ValidationRule,
};
pub use slotkeeper_storage::{LocalStorage, Storage, StorageError};
