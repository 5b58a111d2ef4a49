//! Outcomes of the storage-touching phases.

use serde::Serialize;

/// A best-effort deletion that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of [`crate::FileSlotManager::commit_ingest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitResult {
    /// Nothing was pending for the slot; storage untouched
    Skipped,
    /// The upload was written; `replaced` names the previous file removed
    Written {
        name: String,
        replaced: Option<String>,
    },
    /// The upload was written but the previous file could not be removed
    WrittenCleanupFailed {
        name: String,
        failure: CleanupFailure,
    },
}

impl CommitResult {
    pub fn is_written(&self) -> bool {
        !matches!(self, CommitResult::Skipped)
    }

    pub fn written_name(&self) -> Option<&str> {
        match self {
            CommitResult::Skipped => None,
            CommitResult::Written { name, .. } | CommitResult::WrittenCleanupFailed { name, .. } => {
                Some(name)
            }
        }
    }
}

/// What happened to one slot during a purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PurgeOutcome {
    Deleted { name: String },
    AlreadyAbsent { name: String },
    /// The slot had no stored name
    NoFile,
    Failed { failure: CleanupFailure },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotPurge {
    pub slot: String,
    pub outcome: PurgeOutcome,
}

/// Aggregate outcome of [`crate::FileSlotManager::purge_all`].
///
/// Every slot is attempted independently; one failure does not stop the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeResult {
    /// `true` when auto-delete is off and nothing was attempted
    pub disabled: bool,
    pub slots: Vec<SlotPurge>,
}

impl PurgeResult {
    pub(crate) fn disabled() -> Self {
        Self {
            disabled: true,
            slots: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn deleted_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.outcome, PurgeOutcome::Deleted { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CleanupFailure> {
        self.slots.iter().filter_map(|s| match &s.outcome {
            PurgeOutcome::Failed { failure } => Some(failure),
            _ => None,
        })
    }
}
