use itertools::Itertools;
use std::fmt;
use thiserror::Error;

/// Errors raised while building a `Catalog` from status definitions.
///
/// These are authoring-time rejections: a catalog that fails any of them
/// would make namespaced keys ambiguous or path detection unbounded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    Conversion(#[from] CatalogConversionError),

    #[error("Status id '{0}' is declared more than once")]
    DuplicateStatus(String),

    #[error("Catalog has no default status")]
    NoDefaultStatus,

    #[error("Catalog marks more than one status as default: {}", .0.join(", "))]
    MultipleDefaultStatuses(Vec<String>),

    #[error("Status '{status_id}' has an empty {what}")]
    EmptyName { status_id: String, what: &'static str },

    #[error(
        "Field '{field}' on status '{status_id}' maps option '{option}' to a child, but '{option}' is not one of its options"
    )]
    UndeclaredOption {
        status_id: String,
        field: String,
        option: String,
    },

    #[error(
        "Field '{field}' on status '{status_id}' maps option '{option}' to unknown status '{child_id}'"
    )]
    UnknownChildStatus {
        status_id: String,
        field: String,
        option: String,
        child_id: String,
    },

    #[error("Field '{field}' on status '{status_id}' declares child statuses but is not a select")]
    BranchOnNonSelect { status_id: String, field: String },

    #[error("'{name}' on status '{status_id}' contains the key separator '{separator}'")]
    SeparatorCollision {
        status_id: String,
        name: String,
        separator: String,
    },

    #[error("The key separator must not be empty")]
    EmptySeparator,

    #[error("Branching from status '{0}' leads back to itself")]
    Cycle(String),

    #[error("Branching below status '{status_id}' exceeds the maximum depth of {max_depth}")]
    TooDeep { status_id: String, max_depth: usize },
}

/// Errors that can occur when converting a custom catalog format into status definitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogConversionError {
    #[error("Failed to parse catalog JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors raised when a flat storage key cannot be parsed back into a `FieldKey`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Key '{0}' is empty or has an empty segment")]
    EmptySegment(String),

    #[error("Key '{0}' has a branch field without a selected option")]
    UnpairedSegment(String),
}

/// Errors raised when a path does not fit the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Status '{0}' does not exist in the catalog")]
    UnknownStatus(String),

    #[error("Path is empty or its first step was reached through a branch")]
    NotRooted,

    #[error(
        "Status '{status_id}' cannot be reached from '{parent_id}' by choosing '{option}' for '{field}'"
    )]
    InvalidBranch {
        parent_id: String,
        field: String,
        option: String,
        status_id: String,
    },

    #[error("Status '{0}' is final and cannot branch further")]
    FinalStatusHasChildren(String),

    #[error("Depth {depth} is outside a path of length {len}")]
    DepthOutOfRange { depth: usize, len: usize },
}

/// A single required field that had no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub status_id: String,
    pub status_name: String,
    pub field_name: String,
    /// Encoded storage key the value was looked up under.
    pub key: String,
}

/// One or more required fields were left unset.
///
/// Always recoverable: the user fills the listed fields and retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Missing field names grouped by the status that required them, in path order.
    pub fn by_status(&self) -> Vec<(String, Vec<String>)> {
        self.violations
            .iter()
            .chunk_by(|v| v.status_name.clone())
            .into_iter()
            .map(|(status, group)| (status, group.map(|v| v.field_name.clone()).collect()))
            .collect()
    }

    pub fn contains(&self, status_name: &str, field_name: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.status_name == status_name && v.field_name == field_name)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups = self
            .by_status()
            .into_iter()
            .map(|(status, fields)| format!("{}: {}", status, fields.join(", ")))
            .join("; ");
        write!(f, "missing required fields: {}", groups)
    }
}

/// A stored value for a branching field that matches none of its options.
///
/// Path detection stops at the parent when it meets one. It is reported for
/// catalog data-quality review, never returned as an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbiguousBranch {
    pub status_id: String,
    pub field: String,
    pub key: String,
    pub found: serde_json::Value,
}

impl fmt::Display for AmbiguousBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value {} stored under '{}' is not an option of '{}' on status '{}'",
            self.found, self.key, self.field, self.status_id
        )
    }
}

/// Persisted keys the current catalog cannot account for.
///
/// They pass through every merge untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDrift {
    pub keys: Vec<String>,
}

impl SchemaDrift {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Errors raised while building a transition payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Edit sets '{key}' to {edited}, but the path selects '{path_option}'")]
    BranchConflict {
        key: String,
        path_option: String,
        edited: serde_json::Value,
    },

    #[error("Edit chooses '{option}' for '{key}', which opens status '{child_id}' the path does not enter")]
    UnfollowedBranch {
        key: String,
        option: String,
        child_id: String,
    },

    #[error("Merged data leads to [{}] instead of [{}]", .detected.join(", "), .expected.join(", "))]
    PathMismatch {
        expected: Vec<String>,
        detected: Vec<String>,
    },
}

/// Errors reported by a `LeadStore`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Lead '{0}' not found")]
    NotFound(String),

    #[error("Writing lead '{lead_id}' failed: {message}")]
    WriteFailed { lead_id: String, message: String },
}

/// Errors raised by an `EditSession`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Persisting the transition failed, edits kept for retry: {0}")]
    Persistence(#[from] StoreError),
}

/// Errors raised while saving or loading a catalog snapshot.
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    #[error("{0}")]
    Generic(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
