//! File slot manager
//!
//! Owns rename-on-ingest, write-to-storage and delete-on-replace /
//! delete-on-destroy for the file slots of one record. Each phase is an
//! explicit call made by the lifecycle owner in this order:
//!
//! load → `capture_baseline`, validate → `prepare_ingest`,
//! after persist → `commit_ingest`, after destroy → `purge_all`.
//!
//! `prepare_ingest` and `commit_ingest` are decoupled: a stored name can be
//! persisted by the caller before its file write is confirmed. On a
//! `StorageWrite` error the caller decides whether to roll back.

use std::collections::BTreeMap;
use std::sync::Arc;

use slotkeeper_core::config::validate_slot_names;
use slotkeeper_core::{
    compose_stored_name, derive_slot_names, ConfigError, ManagerConfig, RawUpload, RecordContext,
    SlotSelection, ValidationRule,
};
use slotkeeper_storage::{create_storage, Storage};

use crate::error::{SlotError, SlotResult};
use crate::policy::RenamePolicy;
use crate::result::{CleanupFailure, CommitResult, PurgeOutcome, PurgeResult, SlotPurge};
use crate::slot::Slot;

/// Builder binding a [`ManagerConfig`] to a record's slots.
pub struct ManagerBuilder {
    config: ManagerConfig,
    storage: Option<Arc<dyn Storage>>,
    rename_policy: Option<RenamePolicy>,
    validation_rules: Vec<ValidationRule>,
}

impl ManagerBuilder {
    /// Use a specific storage backend instead of local storage over
    /// `storage_directory`.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Override the configured rename policy (e.g. with a custom function).
    pub fn rename_policy(mut self, policy: RenamePolicy) -> Self {
        self.rename_policy = Some(policy);
        self
    }

    /// Validation metadata used when slots are derived.
    pub fn validation_rules(mut self, rules: &[ValidationRule]) -> Self {
        self.validation_rules = rules.to_vec();
        self
    }

    /// Resolve slots and validate everything; the returned manager's
    /// configuration is fixed.
    pub fn bind(self) -> SlotResult<FileSlotManager> {
        let ManagerBuilder {
            config,
            storage,
            rename_policy,
            validation_rules,
        } = self;

        config.validate()?;

        let policy = rename_policy.unwrap_or_else(|| {
            RenamePolicy::from_kind(config.rename_policy, config.random_token_bytes)
        });
        policy.validate()?;

        let slot_names = match &config.slot_names {
            SlotSelection::Explicit(names) => names.clone(),
            SlotSelection::Derive => {
                let derived = derive_slot_names(&validation_rules);
                if derived.is_empty() {
                    return Err(ConfigError::NoSlotsDerived.into());
                }
                validate_slot_names(&derived)?;
                derived
            }
        };

        let storage = match storage {
            Some(storage) => storage,
            None => create_storage(&config).map_err(|e| ConfigError::InvalidValue {
                key: "storage_directory".to_string(),
                value: e.to_string(),
            })?,
        };

        tracing::debug!(
            slots = ?slot_names,
            rename_policy = policy.name(),
            storage_directory = %config.storage_directory.display(),
            "File slot manager bound"
        );

        Ok(FileSlotManager {
            slots: slot_names.into_iter().map(Slot::new).collect(),
            config,
            policy,
            storage,
        })
    }
}

/// Manages the stored files of one record's slots.
///
/// Request scoped: one manager per record per save cycle, used from a single
/// task. Nothing guards two records computing the same stored name.
pub struct FileSlotManager {
    config: ManagerConfig,
    policy: RenamePolicy,
    storage: Arc<dyn Storage>,
    slots: Vec<Slot>,
}

impl FileSlotManager {
    pub fn builder(config: ManagerConfig) -> ManagerBuilder {
        ManagerBuilder {
            config,
            storage: None,
            rename_policy: None,
            validation_rules: Vec::new(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn rename_policy(&self) -> &RenamePolicy {
        &self.policy
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    fn slot_index(&self, name: &str) -> SlotResult<usize> {
        self.slots
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| SlotError::UnknownSlot(name.to_string()))
    }

    /// Record the stored names read from durable storage as the baseline.
    ///
    /// Empty values count as "no file". Values for names that are not slots
    /// are ignored. Calling this again with the same values changes nothing.
    pub fn capture_baseline<I, K, V>(&mut self, record: &RecordContext, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in values {
            let key = key.as_ref();
            let Some(slot) = self.slots.iter_mut().find(|s| s.name == key) else {
                tracing::debug!(attribute = %key, "Ignoring baseline value for unknown slot");
                continue;
            };

            let value = value.as_ref();
            let stored = (!value.is_empty()).then(|| value.to_string());
            slot.previous_stored_name = stored.clone();
            slot.current_stored_name = stored;
            slot.pending_upload = None;
        }

        tracing::debug!(record_id = ?record.id, "Captured file slot baseline");
    }

    /// Compute the stored name for `slot` ahead of the record being saved.
    ///
    /// With an upload, the rename policy runs once and the upload becomes the
    /// slot's pending file. Without one, the baseline name is restored and
    /// any stale pending upload dropped. Storage is not touched.
    ///
    /// If the rename policy fails, the slot is reset to its baseline as well,
    /// so an upload prepared earlier in the cycle is never committed.
    pub fn prepare_ingest(
        &mut self,
        slot: &str,
        incoming: Option<RawUpload>,
        record: &RecordContext,
    ) -> SlotResult<Option<String>> {
        let idx = self.slot_index(slot)?;

        match incoming {
            Some(upload) => {
                let base_name = match self.policy.apply(&upload.base_name, record) {
                    Ok(base_name) => base_name,
                    Err(e) => {
                        self.slots[idx].reset_to_baseline();
                        tracing::warn!(slot = %slot, error = %e, "Rename policy failed");
                        return Err(e.into());
                    }
                };
                let stored_name = compose_stored_name(&base_name, &upload.extension);

                tracing::debug!(
                    slot = %slot,
                    original = %upload.base_name,
                    stored_name = %stored_name,
                    size_bytes = upload.size(),
                    "Prepared upload"
                );

                let state = &mut self.slots[idx];
                state.current_stored_name = Some(stored_name);
                state.pending_upload = Some(upload);
            }
            None => {
                self.slots[idx].reset_to_baseline();

                tracing::debug!(slot = %slot, "No upload; restored baseline name");
            }
        }

        Ok(self.slots[idx].current_stored_name.clone())
    }

    /// Write the pending upload of `slot` and clean up the file it replaces.
    ///
    /// Without a pending upload this is a no-op. Removal of the previous file
    /// is best effort and only attempted after a successful write. Once
    /// written, the new name becomes the slot's baseline.
    pub async fn commit_ingest(&mut self, slot: &str) -> SlotResult<CommitResult> {
        let idx = self.slot_index(slot)?;

        let state = &self.slots[idx];
        let (upload, name) = match (&state.pending_upload, &state.current_stored_name) {
            (Some(upload), Some(name)) => (upload.clone(), name.clone()),
            _ => {
                tracing::debug!(slot = %slot, "Nothing pending; commit skipped");
                return Ok(CommitResult::Skipped);
            }
        };
        let previous = state.previous_stored_name.clone();

        self.write_upload(&name, &upload).await?;

        let result = match previous {
            Some(previous) if self.config.delete_previous_on_replace && previous != name => {
                match self.storage.delete(&previous).await {
                    Ok(_) => CommitResult::Written {
                        name: name.clone(),
                        replaced: Some(previous),
                    },
                    Err(e) => {
                        tracing::warn!(
                            slot = %slot,
                            previous = %previous,
                            error = %e,
                            "Failed to delete replaced file"
                        );
                        CommitResult::WrittenCleanupFailed {
                            name: name.clone(),
                            failure: CleanupFailure {
                                name: previous,
                                reason: e.to_string(),
                            },
                        }
                    }
                }
            }
            _ => CommitResult::Written {
                name: name.clone(),
                replaced: None,
            },
        };

        let state = &mut self.slots[idx];
        state.previous_stored_name = Some(name);
        state.pending_upload = None;

        Ok(result)
    }

    /// Commit every slot in configured order, stopping at the first write error.
    pub async fn commit_all(&mut self) -> SlotResult<Vec<(String, CommitResult)>> {
        let names: Vec<String> = self.slots.iter().map(|s| s.name.clone()).collect();
        let mut results = Vec::with_capacity(names.len());

        for name in names {
            let result = self.commit_ingest(&name).await?;
            results.push((name, result));
        }

        Ok(results)
    }

    async fn write_upload(&self, name: &str, upload: &RawUpload) -> SlotResult<()> {
        let written = match self.storage.ensure_root().await {
            Ok(()) => self.storage.write(name, upload.data.clone()).await,
            Err(e) => Err(e),
        };

        written.map_err(|source| {
            tracing::error!(
                name = %name,
                location = %self.storage.locate(name),
                error = %source,
                "Failed to store upload"
            );
            SlotError::StorageWrite {
                name: name.to_string(),
                source,
            }
        })
    }

    /// Delete the stored file of every slot after the record was destroyed.
    ///
    /// A no-op when auto-delete is disabled. Missing files are not failures,
    /// and a failing slot does not stop the others.
    pub async fn purge_all(&self, record: &RecordContext) -> PurgeResult {
        if !self.config.auto_delete_on_destroy {
            tracing::debug!(record_id = ?record.id, "Auto-delete disabled; purge skipped");
            return PurgeResult::disabled();
        }

        let mut result = PurgeResult::default();

        for slot in &self.slots {
            let outcome = match slot.purge_target() {
                None => PurgeOutcome::NoFile,
                Some(name) => match self.storage.delete(name).await {
                    Ok(true) => PurgeOutcome::Deleted {
                        name: name.to_string(),
                    },
                    Ok(false) => PurgeOutcome::AlreadyAbsent {
                        name: name.to_string(),
                    },
                    Err(e) => {
                        tracing::warn!(
                            record_id = ?record.id,
                            slot = %slot.name,
                            name = %name,
                            error = %e,
                            "Failed to purge stored file"
                        );
                        PurgeOutcome::Failed {
                            failure: CleanupFailure {
                                name: name.to_string(),
                                reason: e.to_string(),
                            },
                        }
                    }
                },
            };

            result.slots.push(SlotPurge {
                slot: slot.name.clone(),
                outcome,
            });
        }

        tracing::info!(
            record_id = ?record.id,
            deleted = result.deleted_count(),
            failed = result.failures().count(),
            "Purged stored files"
        );

        result
    }

    /// Current stored name per slot, for the caller to persist.
    pub fn current_values(&self) -> BTreeMap<String, Option<String>> {
        self.slots
            .iter()
            .map(|s| (s.name.clone(), s.current_stored_name.clone()))
            .collect()
    }

    /// Storage location of the slot's current file.
    pub fn stored_path(&self, slot: &str) -> SlotResult<Option<String>> {
        let idx = self.slot_index(slot)?;
        Ok(self.slots[idx]
            .current_stored_name
            .as_deref()
            .map(|name| self.storage.locate(name)))
    }

    /// Public URL of the slot's current file, when the storage backend
    /// serves one.
    pub fn file_url(&self, slot: &str) -> SlotResult<Option<String>> {
        let idx = self.slot_index(slot)?;
        Ok(self.slots[idx]
            .current_stored_name
            .as_deref()
            .and_then(|name| self.storage.public_url(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotkeeper_core::{RenamePolicyKind, RuleKind};
    use slotkeeper_storage::LocalStorage;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn config(slots: &[&str], dir: &std::path::Path) -> ManagerConfig {
        ManagerConfig {
            storage_directory: dir.to_path_buf(),
            rename_policy: RenamePolicyKind::None,
            slot_names: SlotSelection::explicit(slots.iter().copied()).unwrap(),
            ..ManagerConfig::default()
        }
    }

    #[test]
    fn test_bind_explicit_slots() {
        let dir = tempdir().unwrap();
        let manager = FileSlotManager::builder(config(&["avatar", "cover"], dir.path()))
            .bind()
            .unwrap();

        let names: Vec<&str> = manager.slots().iter().map(Slot::name).collect();
        assert_eq!(names, vec!["avatar", "cover"]);
        assert_eq!(manager.rename_policy().name(), "none");
    }

    #[test]
    fn test_bind_derives_slots_from_rules() {
        let dir = tempdir().unwrap();
        let config = ManagerConfig {
            storage_directory: dir.path().to_path_buf(),
            ..ManagerConfig::default()
        };
        let rules = vec![
            ValidationRule::new(["name"], RuleKind::Other("string".to_string())),
            ValidationRule::new(["avatar"], RuleKind::Image),
            ValidationRule::new(["contract"], RuleKind::File),
        ];

        let manager = FileSlotManager::builder(config)
            .validation_rules(&rules)
            .bind()
            .unwrap();

        let names: Vec<&str> = manager.slots().iter().map(Slot::name).collect();
        assert_eq!(names, vec!["avatar", "contract"]);
    }

    #[test]
    fn test_bind_derive_without_rules_fails() {
        let dir = tempdir().unwrap();
        let config = ManagerConfig {
            storage_directory: dir.path().to_path_buf(),
            ..ManagerConfig::default()
        };

        let result = FileSlotManager::builder(config).bind();
        assert!(matches!(
            result,
            Err(SlotError::Configuration(ConfigError::NoSlotsDerived))
        ));
    }

    #[test]
    fn test_bind_rejects_invalid_policy_eagerly() {
        let dir = tempdir().unwrap();
        let result = FileSlotManager::builder(config(&["avatar"], dir.path()))
            .rename_policy(RenamePolicy::RandomToken { bytes: 0 })
            .bind();
        assert!(matches!(result, Err(SlotError::Configuration(_))));
    }

    #[test]
    fn test_unknown_slot() {
        let dir = tempdir().unwrap();
        let mut manager = FileSlotManager::builder(config(&["avatar"], dir.path()))
            .bind()
            .unwrap();

        let result = manager.prepare_ingest("banner", None, &RecordContext::new());
        assert!(matches!(result, Err(SlotError::UnknownSlot(name)) if name == "banner"));
    }

    #[test]
    fn test_capture_baseline_ignores_unknown_and_empty() {
        let dir = tempdir().unwrap();
        let mut manager = FileSlotManager::builder(config(&["avatar", "cover"], dir.path()))
            .bind()
            .unwrap();

        let values = HashMap::from([
            ("avatar".to_string(), "orig.png".to_string()),
            ("cover".to_string(), String::new()),
            ("title".to_string(), "Hello".to_string()),
        ]);
        manager.capture_baseline(&RecordContext::with_id("1"), &values);
        manager.capture_baseline(&RecordContext::with_id("1"), &values);

        let avatar = manager.slot("avatar").unwrap();
        assert_eq!(avatar.previous_stored_name(), Some("orig.png"));
        assert_eq!(avatar.current_stored_name(), Some("orig.png"));
        assert_eq!(manager.slot("cover").unwrap().previous_stored_name(), None);
    }

    #[test]
    fn test_prepare_replaces_pending_upload() {
        let dir = tempdir().unwrap();
        let mut manager = FileSlotManager::builder(config(&["avatar"], dir.path()))
            .bind()
            .unwrap();
        let record = RecordContext::new();

        manager
            .prepare_ingest("avatar", Some(RawUpload::new("first", "png", b"1".to_vec())), &record)
            .unwrap();
        let name = manager
            .prepare_ingest("avatar", Some(RawUpload::new("second", "gif", b"2".to_vec())), &record)
            .unwrap();

        assert_eq!(name.as_deref(), Some("second.gif"));
        let slot = manager.slot("avatar").unwrap();
        assert_eq!(slot.pending_upload().unwrap().base_name, "second");
    }

    #[test]
    fn test_prepare_sanitizes_custom_names() {
        let dir = tempdir().unwrap();
        let mut manager = FileSlotManager::builder(config(&["avatar"], dir.path()))
            .rename_policy(RenamePolicy::custom(|base, _| Ok(format!("../{} copy", base))))
            .bind()
            .unwrap();

        let name = manager
            .prepare_ingest(
                "avatar",
                Some(RawUpload::new("me", "png", b"x".to_vec())),
                &RecordContext::new(),
            )
            .unwrap();
        assert_eq!(name.as_deref(), Some("me_copy.png"));
    }

    #[tokio::test]
    async fn test_commit_promotes_written_name_to_baseline() {
        let dir = tempdir().unwrap();
        let mut manager = FileSlotManager::builder(config(&["avatar"], dir.path()))
            .bind()
            .unwrap();
        let record = RecordContext::new();

        manager
            .prepare_ingest("avatar", Some(RawUpload::new("new", "png", b"x".to_vec())), &record)
            .unwrap();
        let result = manager.commit_ingest("avatar").await.unwrap();
        assert_eq!(
            result,
            CommitResult::Written {
                name: "new.png".to_string(),
                replaced: None
            }
        );

        assert_eq!(manager.commit_ingest("avatar").await.unwrap(), CommitResult::Skipped);

        let restored = manager.prepare_ingest("avatar", None, &record).unwrap();
        assert_eq!(restored.as_deref(), Some("new.png"));
    }

    #[tokio::test]
    async fn test_same_name_replacement_keeps_file() {
        let dir = tempdir().unwrap();
        let mut manager = FileSlotManager::builder(config(&["avatar"], dir.path()))
            .bind()
            .unwrap();
        let record = RecordContext::new();
        manager.capture_baseline(&record, [("avatar", "photo.jpg")]);

        manager
            .prepare_ingest("avatar", Some(RawUpload::new("photo", "jpg", b"v2".to_vec())), &record)
            .unwrap();
        let result = manager.commit_ingest("avatar").await.unwrap();

        assert_eq!(
            result,
            CommitResult::Written {
                name: "photo.jpg".to_string(),
                replaced: None
            }
        );
        assert_eq!(std::fs::read(dir.path().join("photo.jpg")).unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_commit_all_in_order() {
        let dir = tempdir().unwrap();
        let mut manager = FileSlotManager::builder(config(&["avatar", "cover"], dir.path()))
            .bind()
            .unwrap();
        let record = RecordContext::new();

        manager
            .prepare_ingest("cover", Some(RawUpload::new("c", "jpg", b"c".to_vec())), &record)
            .unwrap();
        let results = manager.commit_all().await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], ("avatar".to_string(), CommitResult::Skipped));
        assert_eq!(results[1].1.written_name(), Some("c.jpg"));
    }

    #[test]
    fn test_stored_path_and_file_url() {
        let dir = tempdir().unwrap();
        let mut config = config(&["avatar"], dir.path());
        config.base_url = Some("https://cdn.example.com/u/".to_string());
        let mut manager = FileSlotManager::builder(config).bind().unwrap();
        let record = RecordContext::new();

        assert_eq!(manager.file_url("avatar").unwrap(), None);

        manager.capture_baseline(&record, [("avatar", "a.png")]);
        assert_eq!(
            manager.file_url("avatar").unwrap().as_deref(),
            Some("https://cdn.example.com/u/a.png")
        );
        assert_eq!(
            manager.stored_path("avatar").unwrap(),
            Some(dir.path().join("a.png").display().to_string())
        );
        assert!(matches!(
            manager.file_url("nope"),
            Err(SlotError::UnknownSlot(_))
        ));
    }

    #[tokio::test]
    async fn test_explicit_storage_backend_is_used() {
        let dir = tempdir().unwrap();
        let other = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(other.path(), None));
        let mut manager = FileSlotManager::builder(config(&["avatar"], dir.path()))
            .storage(storage)
            .bind()
            .unwrap();

        manager
            .prepare_ingest(
                "avatar",
                Some(RawUpload::new("x", "bin", b"1".to_vec())),
                &RecordContext::new(),
            )
            .unwrap();
        manager.commit_ingest("avatar").await.unwrap();

        assert!(other.path().join("x.bin").is_file());
        assert!(!dir.path().join("x.bin").exists());
    }
}
