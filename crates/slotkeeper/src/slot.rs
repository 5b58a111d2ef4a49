use slotkeeper_core::RawUpload;

/// A named binding between a record attribute and an uploaded-file lifecycle.
///
/// Holds at most one pending upload at a time. Slots live exactly as long as
/// the manager bound to their record.
#[derive(Debug, Clone)]
pub struct Slot {
    pub(crate) name: String,
    pub(crate) previous_stored_name: Option<String>,
    pub(crate) pending_upload: Option<RawUpload>,
    pub(crate) current_stored_name: Option<String>,
}

impl Slot {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            previous_stored_name: None,
            pending_upload: None,
            current_stored_name: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored name held before the current save cycle began
    pub fn previous_stored_name(&self) -> Option<&str> {
        self.previous_stored_name.as_deref()
    }

    /// Stored name that will be (or has been) persisted for this slot
    pub fn current_stored_name(&self) -> Option<&str> {
        self.current_stored_name.as_deref()
    }

    pub fn pending_upload(&self) -> Option<&RawUpload> {
        self.pending_upload.as_ref()
    }

    pub fn has_pending_upload(&self) -> bool {
        self.pending_upload.is_some()
    }

    /// Drop any pending upload and fall back to the baseline name.
    pub(crate) fn reset_to_baseline(&mut self) {
        self.current_stored_name = self.previous_stored_name.clone();
        self.pending_upload = None;
    }

    /// Name to remove when the owning record is destroyed.
    pub(crate) fn purge_target(&self) -> Option<&str> {
        self.current_stored_name
            .as_deref()
            .or(self.previous_stored_name.as_deref())
    }
}
