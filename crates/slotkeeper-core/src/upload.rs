//! Incoming upload and record context value types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw bytes of an uploaded file together with its original name parts.
///
/// The form layer that produced the bytes is out of scope; callers build this
/// from whatever upload primitive their framework hands them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUpload {
    pub base_name: String,
    pub extension: String,
    pub data: Bytes,
    pub content_type: Option<String>,
}

impl RawUpload {
    pub fn new(
        base_name: impl Into<String>,
        extension: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            base_name: base_name.into(),
            extension: extension.into(),
            data: data.into(),
            content_type: None,
        }
    }

    /// Split an original client filename at its last `.` into base name and
    /// extension. Directory components are discarded.
    pub fn from_filename(original_filename: &str, data: impl Into<Bytes>) -> Self {
        let file_only = original_filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(original_filename);

        let (base_name, extension) = match file_only.rfind('.') {
            Some(idx) if idx > 0 => (&file_only[..idx], &file_only[idx + 1..]),
            _ => (file_only, ""),
        };

        Self::new(base_name, extension, data)
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Read-only view of the record that owns the file slots.
///
/// Handed to rename policies so custom functions can derive names from record
/// attributes; the manager never reaches into the record itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordContext {
    pub id: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl RecordContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename_splits_at_last_dot() {
        let upload = RawUpload::from_filename("archive.tar.gz", b"x".to_vec());
        assert_eq!(upload.base_name, "archive.tar");
        assert_eq!(upload.extension, "gz");
        assert_eq!(upload.size(), 1);
    }

    #[test]
    fn test_from_filename_without_extension() {
        let upload = RawUpload::from_filename("README", Bytes::new());
        assert_eq!(upload.base_name, "README");
        assert_eq!(upload.extension, "");
    }

    #[test]
    fn test_from_filename_dotfile_and_directories() {
        let upload = RawUpload::from_filename("/tmp/uploads/.env", Bytes::new());
        assert_eq!(upload.base_name, ".env");
        assert_eq!(upload.extension, "");

        let upload = RawUpload::from_filename("C:\\pics\\cat.PNG", Bytes::new());
        assert_eq!(upload.base_name, "cat");
        assert_eq!(upload.extension, "PNG");
    }

    #[test]
    fn test_record_context_attributes() {
        let record = RecordContext::with_id("42").attribute("username", "ada");
        assert_eq!(record.id.as_deref(), Some("42"));
        assert_eq!(record.get("username"), Some("ada"));
        assert_eq!(record.get("missing"), None);
    }
}
