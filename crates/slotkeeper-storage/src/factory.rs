#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{Storage, StorageResult};
use slotkeeper_core::ManagerConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
#[cfg(feature = "storage-local")]
pub fn create_storage(config: &ManagerConfig) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.storage_directory.clone(), config.base_url.clone());
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "storage-local"))]
pub fn create_storage(_config: &ManagerConfig) -> StorageResult<Arc<dyn Storage>> {
    Err(crate::StorageError::ConfigError(
        "Local storage backend not available (storage-local feature not enabled)".to_string(),
    ))
}
