//! Filename sanitization for stored file names.
//!
//! Every stored name is a single filesystem-safe path component built from a
//! base name and the extension of the original upload.

/// Longest file name most filesystems accept, in bytes.
pub const MAX_STORED_NAME_LENGTH: usize = 255;
const MAX_EXTENSION_LENGTH: usize = 32;
const FALLBACK_BASE_NAME: &str = "file";

/// Sanitize a single filename component.
///
/// Directory components are stripped, characters outside `[A-Za-z0-9._-]` are
/// replaced with `_`, runs of dots are collapsed and leading dots removed. The
/// result may be empty.
pub fn sanitize_component(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let mut sanitized: String = last
        .chars()
        .take(MAX_STORED_NAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }

    sanitized.trim_start_matches('.').to_string()
}

/// Build the stored name `base.extension` from raw parts.
///
/// An empty base falls back to `file`; an empty extension yields a name with
/// no trailing dot. The extension is capped first, then the base is shortened
/// so the whole name fits in [`MAX_STORED_NAME_LENGTH`] bytes.
pub fn compose_stored_name(base_name: &str, extension: &str) -> String {
    let mut extension = sanitize_component(extension)
        .trim_matches('.')
        .to_string();
    extension.truncate(MAX_EXTENSION_LENGTH);
    let extension = extension.trim_end_matches('.');

    let budget = if extension.is_empty() {
        MAX_STORED_NAME_LENGTH
    } else {
        MAX_STORED_NAME_LENGTH - extension.len() - 1
    };

    // Sanitized output is ASCII, so byte truncation stays on char boundaries.
    let mut base = sanitize_component(base_name);
    base.truncate(budget);
    let base_trimmed = base.trim_end_matches('.').len();
    base.truncate(base_trimmed);
    if base.is_empty() {
        base = FALLBACK_BASE_NAME.to_string();
    }

    if extension.is_empty() {
        base
    } else {
        format!("{}.{}", base, extension)
    }
}
