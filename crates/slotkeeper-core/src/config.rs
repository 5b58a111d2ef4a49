//! Configuration module
//!
//! This module provides the immutable configuration of a file slot manager:
//! where files are stored, how uploads are renamed, which slots exist and
//! which cleanup behaviours are enabled.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

// Defaults
const STORAGE_DIRECTORY: &str = "uploads";
const RANDOM_TOKEN_BYTES: usize = 16;
const MAX_RANDOM_TOKEN_BYTES: usize = 64;
const DERIVE_MARKER: &str = "derive";

/// Built-in rename policies that can be selected from configuration.
///
/// Caller-supplied rename functions cannot be expressed in configuration and
/// are attached when the manager is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenamePolicyKind {
    /// Keep the original base name
    None,
    /// Hex MD5 digest of the original base name
    Md5,
    /// Hex SHA-256 digest of the original base name
    Sha256,
    /// Lowercase, dash-separated form of the original base name
    Slug,
    /// Random hex token, independent of the original base name
    #[default]
    Random,
}

impl FromStr for RenamePolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "original" => Ok(RenamePolicyKind::None),
            "md5" => Ok(RenamePolicyKind::Md5),
            "sha256" => Ok(RenamePolicyKind::Sha256),
            "slug" | "slugify" => Ok(RenamePolicyKind::Slug),
            "random" => Ok(RenamePolicyKind::Random),
            _ => Err(ConfigError::InvalidRenamePolicy(s.to_string())),
        }
    }
}

impl Display for RenamePolicyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RenamePolicyKind::None => write!(f, "none"),
            RenamePolicyKind::Md5 => write!(f, "md5"),
            RenamePolicyKind::Sha256 => write!(f, "sha256"),
            RenamePolicyKind::Slug => write!(f, "slug"),
            RenamePolicyKind::Random => write!(f, "random"),
        }
    }
}

/// Which record attributes are file slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum SlotSelection {
    /// Derive slots from validation metadata at bind time
    #[default]
    Derive,
    /// Explicit ordered slot names
    Explicit(Vec<String>),
}

impl SlotSelection {
    /// Build an explicit selection, validating every name.
    pub fn explicit<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        validate_slot_names(&names)?;
        Ok(SlotSelection::Explicit(names))
    }

    /// Parse `derive` or a comma separated list of slot names.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(DERIVE_MARKER) {
            return Ok(SlotSelection::Derive);
        }
        Self::explicit(trimmed.split(',').map(str::trim))
    }

    /// Interpret an untyped configuration value.
    ///
    /// Strings are parsed with [`SlotSelection::parse`], arrays must contain
    /// only strings. Any other shape is malformed.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Array(items) => {
                let names = items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            ConfigError::MalformedSlotNames(format!(
                                "slot names must be strings, found {}",
                                item
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::explicit(names)
            }
            other => Err(ConfigError::MalformedSlotNames(format!(
                "expected a string or a list of strings, found {}",
                other
            ))),
        }
    }

    pub fn is_derive(&self) -> bool {
        matches!(self, SlotSelection::Derive)
    }
}

impl TryFrom<Value> for SlotSelection {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<SlotSelection> for Value {
    fn from(selection: SlotSelection) -> Self {
        match selection {
            SlotSelection::Derive => Value::String(DERIVE_MARKER.to_string()),
            SlotSelection::Explicit(names) => {
                Value::Array(names.into_iter().map(Value::String).collect())
            }
        }
    }
}

/// Check that slot names are non-empty, unique identifiers.
pub fn validate_slot_names(names: &[String]) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::MalformedSlotNames(
            "slot list is empty".to_string(),
        ));
    }

    for (idx, name) in names.iter().enumerate() {
        if name.is_empty() {
            return Err(ConfigError::MalformedSlotNames(
                "slot names cannot be empty".to_string(),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::MalformedSlotNames(format!(
                "invalid slot name '{}'",
                name
            )));
        }
        if names[..idx].contains(name) {
            return Err(ConfigError::DuplicateSlot(name.clone()));
        }
    }

    Ok(())
}

/// File slot manager configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub storage_directory: PathBuf,
    /// Public URL prefix for stored files (e.g. "https://cdn.example.com/uploads")
    pub base_url: Option<String>,
    pub rename_policy: RenamePolicyKind,
    /// Number of random bytes behind the random-token policy (hex encoded)
    pub random_token_bytes: usize,
    pub auto_delete_on_destroy: bool,
    pub delete_previous_on_replace: bool,
    pub slot_names: SlotSelection,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            storage_directory: PathBuf::from(STORAGE_DIRECTORY),
            base_url: None,
            rename_policy: RenamePolicyKind::default(),
            random_token_bytes: RANDOM_TOKEN_BYTES,
            auto_delete_on_destroy: true,
            delete_previous_on_replace: true,
            slot_names: SlotSelection::Derive,
        }
    }
}

impl ManagerConfig {
    /// Load configuration from the process environment (and `.env`, if any).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage_directory = lookup("SLOTKEEPER_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_directory);

        let base_url = lookup("SLOTKEEPER_BASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let rename_policy = match lookup("SLOTKEEPER_RENAME_POLICY") {
            Some(raw) => raw.parse()?,
            None => defaults.rename_policy,
        };

        let random_token_bytes = match lookup("SLOTKEEPER_RANDOM_TOKEN_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid("SLOTKEEPER_RANDOM_TOKEN_BYTES", &raw))?,
            None => defaults.random_token_bytes,
        };

        let auto_delete_on_destroy = match lookup("SLOTKEEPER_AUTO_DELETE") {
            Some(raw) => parse_bool("SLOTKEEPER_AUTO_DELETE", &raw)?,
            None => defaults.auto_delete_on_destroy,
        };

        let delete_previous_on_replace = match lookup("SLOTKEEPER_DELETE_PREVIOUS") {
            Some(raw) => parse_bool("SLOTKEEPER_DELETE_PREVIOUS", &raw)?,
            None => defaults.delete_previous_on_replace,
        };

        let slot_names = match lookup("SLOTKEEPER_SLOTS") {
            Some(raw) => SlotSelection::parse(&raw)?,
            None => defaults.slot_names,
        };

        let config = Self {
            storage_directory,
            base_url,
            rename_policy,
            random_token_bytes,
            auto_delete_on_destroy,
            delete_previous_on_replace,
            slot_names,
        };
        config.validate()?;

        Ok(config)
    }

    /// Re-check invariants, for configurations built in code or deserialized.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_directory.as_os_str().is_empty() {
            return Err(invalid("storage_directory", ""));
        }

        if self.random_token_bytes == 0 || self.random_token_bytes > MAX_RANDOM_TOKEN_BYTES {
            return Err(invalid(
                "random_token_bytes",
                &self.random_token_bytes.to_string(),
            ));
        }

        if let SlotSelection::Explicit(names) = &self.slot_names {
            validate_slot_names(names)?;
        }

        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}
