use std::path::PathBuf;

use anyhow::{bail, Context};
use slotkeeper_core::{ManagerConfig, RenamePolicyKind, SlotSelection};

/// Parse a `slot=stored_name` assignment.
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, String)> {
    let Some((slot, name)) = raw.split_once('=') else {
        bail!("expected SLOT=NAME, got '{}'", raw);
    };
    let slot = slot.trim();
    if slot.is_empty() {
        bail!("slot name missing in '{}'", raw);
    }
    Ok((slot.to_string(), name.trim().to_string()))
}

/// Command-line overrides applied on top of the environment configuration.
#[derive(Debug, Default)]
pub struct Overrides {
    pub storage_directory: Option<PathBuf>,
    pub rename_policy: Option<String>,
    pub base_url: Option<String>,
}

/// Apply overrides and pin the slot list to `slots`.
pub fn configure(
    mut config: ManagerConfig,
    overrides: Overrides,
    slots: &[String],
) -> anyhow::Result<ManagerConfig> {
    if let Some(dir) = overrides.storage_directory {
        config.storage_directory = dir;
    }
    if let Some(policy) = overrides.rename_policy {
        config.rename_policy = policy
            .parse::<RenamePolicyKind>()
            .context("Invalid --policy")?;
    }
    if let Some(url) = overrides.base_url {
        config.base_url = Some(url);
    }
    config.slot_names = SlotSelection::explicit(slots.iter().cloned()).context("Invalid slots")?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_assignment_valid() {
        assert_eq!(
            parse_assignment("avatar=a.png").unwrap(),
            ("avatar".to_string(), "a.png".to_string())
        );
        assert_eq!(
            parse_assignment(" cover = ").unwrap(),
            ("cover".to_string(), String::new())
        );
    }

    #[test]
    fn parse_assignment_invalid() {
        assert!(parse_assignment("avatar").is_err());
        assert!(parse_assignment("=a.png").is_err());
    }

    #[test]
    fn configure_applies_overrides() {
        let config = configure(
            ManagerConfig::default(),
            Overrides {
                storage_directory: Some(PathBuf::from("/tmp/files")),
                rename_policy: Some("md5".to_string()),
                base_url: None,
            },
            &["avatar".to_string()],
        )
        .unwrap();

        assert_eq!(config.storage_directory, PathBuf::from("/tmp/files"));
        assert_eq!(config.rename_policy, RenamePolicyKind::Md5);
        assert_eq!(
            config.slot_names,
            SlotSelection::Explicit(vec!["avatar".to_string()])
        );
    }

    #[test]
    fn configure_rejects_bad_policy_and_slots() {
        let bad_policy = configure(
            ManagerConfig::default(),
            Overrides {
                rename_policy: Some("rot13".to_string()),
                ..Overrides::default()
            },
            &["avatar".to_string()],
        );
        assert!(bad_policy.is_err());

        let duplicate = configure(
            ManagerConfig::default(),
            Overrides::default(),
            &["avatar".to_string(), "avatar".to_string()],
        );
        assert!(duplicate.is_err());
    }
}
