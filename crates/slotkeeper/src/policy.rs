//! Rename policies applied to incoming uploads.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use sha2::{Digest, Sha256};
use slotkeeper_core::{ConfigError, RecordContext, RenamePolicyKind};

/// Signature of a caller-supplied rename function.
///
/// Receives the original base name and the owning record; returning an error
/// aborts the ingest with a configuration error.
pub type RenameFn = dyn Fn(&str, &RecordContext) -> anyhow::Result<String> + Send + Sync;

/// Strategy producing the new base name of an uploaded file.
///
/// Exactly one policy is active per manager. It is invoked once per ingest;
/// the extension is appended afterwards by the manager.
#[derive(Clone)]
pub enum RenamePolicy {
    NoRename,
    Md5,
    Sha256,
    Slugify,
    RandomToken { bytes: usize },
    Custom(Arc<RenameFn>),
}

impl RenamePolicy {
    pub fn from_kind(kind: RenamePolicyKind, random_token_bytes: usize) -> Self {
        match kind {
            RenamePolicyKind::None => RenamePolicy::NoRename,
            RenamePolicyKind::Md5 => RenamePolicy::Md5,
            RenamePolicyKind::Sha256 => RenamePolicy::Sha256,
            RenamePolicyKind::Slug => RenamePolicy::Slugify,
            RenamePolicyKind::Random => RenamePolicy::RandomToken {
                bytes: random_token_bytes,
            },
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str, &RecordContext) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        RenamePolicy::Custom(Arc::new(f))
    }

    pub fn name(&self) -> &'static str {
        match self {
            RenamePolicy::NoRename => "none",
            RenamePolicy::Md5 => "md5",
            RenamePolicy::Sha256 => "sha256",
            RenamePolicy::Slugify => "slug",
            RenamePolicy::RandomToken { .. } => "random",
            RenamePolicy::Custom(_) => "custom",
        }
    }

    /// Reject policies that could never produce a name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            RenamePolicy::RandomToken { bytes: 0 } => Err(ConfigError::InvalidRenamePolicy(
                "random token length must be positive".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Compute the new base name for `base_name`.
    pub fn apply(&self, base_name: &str, record: &RecordContext) -> Result<String, ConfigError> {
        let renamed = match self {
            RenamePolicy::NoRename => base_name.to_string(),
            RenamePolicy::Md5 => format!("{:x}", md5::compute(base_name.as_bytes())),
            RenamePolicy::Sha256 => hex::encode(Sha256::digest(base_name.as_bytes())),
            RenamePolicy::Slugify => slugify(base_name),
            RenamePolicy::RandomToken { bytes } => random_token(*bytes),
            RenamePolicy::Custom(f) => {
                f(base_name, record).map_err(|e| ConfigError::RenameFault(format!("{:#}", e)))?
            }
        };

        Ok(renamed)
    }
}

impl fmt::Debug for RenamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenamePolicy::RandomToken { bytes } => {
                f.debug_struct("RandomToken").field("bytes", bytes).finish()
            }
            RenamePolicy::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}

/// Lowercase a name and join its ASCII alphanumeric runs with `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn random_token(bytes: usize) -> String {
    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..bytes).map(|_| rng.random()).collect();
    hex::encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rename_keeps_base_name() {
        let name = RenamePolicy::NoRename
            .apply("photo", &RecordContext::new())
            .unwrap();
        assert_eq!(name, "photo");
    }

    #[test]
    fn test_md5_is_known_digest() {
        let name = RenamePolicy::Md5.apply("photo", &RecordContext::new()).unwrap();
        assert_eq!(name, format!("{:x}", md5::compute(b"photo")));
        assert_eq!(name.len(), 32);
    }

    #[test]
    fn test_sha256_is_known_digest() {
        let name = RenamePolicy::Sha256.apply("abc", &RecordContext::new()).unwrap();
        assert_eq!(
            name,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("photo"), "photo");
        assert_eq!(slugify("My Holiday Photo (2)"), "my-holiday-photo-2");
        assert_eq!(slugify("  --Leading and trailing--  "), "leading-and-trailing");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_random_token_length_and_charset() {
        let name = RenamePolicy::RandomToken { bytes: 16 }
            .apply("photo", &RecordContext::new())
            .unwrap();
        assert_eq!(name.len(), 32);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_zero_length_random_token_rejected() {
        assert!(RenamePolicy::RandomToken { bytes: 0 }.validate().is_err());
        assert!(RenamePolicy::RandomToken { bytes: 4 }.validate().is_ok());
    }

    #[test]
    fn test_custom_policy_receives_record() {
        let policy = RenamePolicy::custom(|base, record| {
            Ok(format!("{}-{}", record.id.as_deref().unwrap_or("new"), base))
        });
        let name = policy
            .apply("photo", &RecordContext::with_id("7"))
            .unwrap();
        assert_eq!(name, "7-photo");
    }

    #[test]
    fn test_custom_policy_fault_is_configuration_error() {
        let policy = RenamePolicy::custom(|_, _| anyhow::bail!("no naming service"));
        let err = policy.apply("photo", &RecordContext::new()).unwrap_err();
        assert!(matches!(err, ConfigError::RenameFault(msg) if msg.contains("no naming service")));
    }

    #[test]
    fn test_from_kind() {
        assert!(matches!(
            RenamePolicy::from_kind(RenamePolicyKind::Random, 8),
            RenamePolicy::RandomToken { bytes: 8 }
        ));
        assert_eq!(
            RenamePolicy::from_kind(RenamePolicyKind::Slug, 8).name(),
            "slug"
        );
    }
}
