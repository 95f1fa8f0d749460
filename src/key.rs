//! Structured storage keys and their flat, separator-joined encoding.
//!
//! A field that belongs to a nested status is stored under a key that also
//! names every branch taken to reach it:
//!
//! ```text
//! Outcome _ Interested _ Stage _ Demo _ Next Meeting Date
//! └─ branch ─────────┘   └─ branch ──┘   └─ field ───────┘
//! ```
//!
//! Inside the crate keys stay structured as [`FieldKey`]. Only the
//! [`Namespacer`] turns them into flat strings, at the persistence boundary.

use crate::error::KeyError;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One branch taken: the branching field and the option chosen for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchStep {
    pub field: String,
    pub option: String,
}

impl BranchStep {
    pub fn new(field: &str, option: &str) -> Self {
        Self {
            field: field.to_string(),
            option: option.to_string(),
        }
    }
}

/// A field name tagged with the branches that lead to its status.
///
/// A field of the root status has no branches and is stored under its bare
/// name. Depth equals the number of branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    pub branches: Vec<BranchStep>,
    pub field: String,
}

impl FieldKey {
    /// Key of a root-status field.
    pub fn plain(field: &str) -> Self {
        Self {
            branches: Vec::new(),
            field: field.to_string(),
        }
    }

    pub fn nested(branches: Vec<BranchStep>, field: &str) -> Self {
        Self {
            branches,
            field: field.to_string(),
        }
    }

    pub fn depth(&self) -> usize {
        self.branches.len()
    }

    pub fn is_namespaced(&self) -> bool {
        !self.branches.is_empty()
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.branches {
            write!(f, "{}[{}].", step.field, step.option)?;
        }
        write!(f, "{}", self.field)
    }
}

/// Encodes and decodes flat storage keys with a single, fixed separator.
///
/// The catalog rejects field names and branch options containing the
/// separator, so every encoded key splits back unambiguously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespacer {
    separator: String,
}

impl Namespacer {
    pub fn new(separator: &str) -> Self {
        Self {
            separator: separator.to_string(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Flat key for `key`: every branch contributes `field SEP option SEP`.
    pub fn encode(&self, key: &FieldKey) -> String {
        let mut encoded = self.prefix(&key.branches);
        encoded.push_str(&key.field);
        encoded
    }

    /// Flat key of `field` declared on the status at `depth` of `path`.
    pub fn key_at(&self, path: &Path, depth: usize, field: &str) -> String {
        self.encode(&path.key_for(depth, field))
    }

    fn prefix(&self, branches: &[BranchStep]) -> String {
        let mut prefix = String::new();
        for step in branches {
            prefix.push_str(&step.field);
            prefix.push_str(&self.separator);
            prefix.push_str(&step.option);
            prefix.push_str(&self.separator);
        }
        prefix
    }

    /// Path-free inverse of [`Namespacer::encode`].
    pub fn parse(&self, raw: &str) -> Result<FieldKey, KeyError> {
        let segments: Vec<&str> = raw.split(self.separator.as_str()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(KeyError::EmptySegment(raw.to_string()));
        }
        if segments.len() % 2 == 0 {
            return Err(KeyError::UnpairedSegment(raw.to_string()));
        }

        let (field, pairs) = segments
            .split_last()
            .ok_or_else(|| KeyError::EmptySegment(raw.to_string()))?;
        let branches = pairs
            .chunks_exact(2)
            .map(|pair| BranchStep::new(pair[0], pair[1]))
            .collect();
        Ok(FieldKey::nested(branches, field))
    }

    /// Recovers `(depth, field name)` of a flat key relative to `path`.
    ///
    /// Returns `None` when the key's branch prefix is not a prefix of the
    /// path's own branch selections.
    pub fn decode(&self, raw: &str, path: &Path) -> Option<(usize, String)> {
        for depth in (1..path.len()).rev() {
            let prefix = self.prefix(&path.branches_to(depth));
            if let Some(field) = raw.strip_prefix(prefix.as_str()) {
                if !field.is_empty() && !field.contains(self.separator.as_str()) {
                    return Some((depth, field.to_string()));
                }
            }
        }
        if !raw.is_empty() && !raw.contains(self.separator.as_str()) {
            return Some((0, raw.to_string()));
        }
        None
    }
}

impl Default for Namespacer {
    fn default() -> Self {
        Self::new(crate::catalog::DEFAULT_SEPARATOR)
    }
}
