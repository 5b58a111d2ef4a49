//! Validation metadata used to derive file slots.
//!
//! Hosts describe their attribute validation rules with `ValidationRule`
//! values; attributes constrained by a file or image rule become slots. The
//! derivation runs once, at bind time.

use serde::{Deserialize, Serialize};

/// Kind of constraint a validation rule applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    File,
    Image,
    Other(String),
}

impl RuleKind {
    pub fn is_upload(&self) -> bool {
        matches!(self, RuleKind::File | RuleKind::Image)
    }
}

/// A validation rule applied to one or more record attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub attributes: Vec<String>,
    pub kind: RuleKind,
}

impl ValidationRule {
    pub fn new<I, S>(attributes: I, kind: RuleKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            kind,
        }
    }
}

/// Collect the attributes tagged with a file or image rule, in first-seen
/// order and without duplicates.
pub fn derive_slot_names(rules: &[ValidationRule]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for rule in rules.iter().filter(|r| r.kind.is_upload()) {
        for attribute in &rule.attributes {
            let attribute = attribute.trim();
            if !attribute.is_empty() && !names.iter().any(|n| n == attribute) {
                names.push(attribute.to_string());
            }
        }
    }

    names
}
