//! Prelude module for convenient imports
//!
//! Re-exports the types needed to build a catalog, detect a lead's path and
//! run an edit session.
//!
//! # Example
//!
//! ```rust,no_run
//! use leadpath::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let catalog_json = std::fs::read_to_string("path/to/catalog.json")?;
//! let catalog = Catalog::builder(catalog_json.as_str()).build()?;
//!
//! let lead_json = std::fs::read_to_string("path/to/lead.json")?;
//! let lead: Lead = serde_json::from_str(&lead_json)?;
//! let path = lead.path(&catalog)?;
//!
//! println!("{}", DisplayPath::new(&path, &catalog));
//! for field in resolve_fields(&path, &catalog) {
//!     println!("{} ({})", field.display_name, catalog.namespacer().encode(&field.key));
//! }
//! # Ok(())
//! # }
//! ```

// Catalog
pub use crate::catalog::{
    Catalog, CatalogBuilder, CatalogOptions, CatalogSnapshot, FieldDefinition, FieldType,
    IntoCatalog, StatusDefinition, StatusId,
};

// Keys and paths
pub use crate::key::{BranchStep, FieldKey, Namespacer};
pub use crate::path::{DisplayPath, Path, PathDetector, PathReport, PathStep, detect_path};

// Leads and persistence
pub use crate::lead::{HistoryEntry, Lead, LeadData, LeadStore, MemoryLeadStore, TransitionPayload};

// Engine
pub use crate::resolver::{FieldSpec, resolve_fields};
pub use crate::session::EditSession;
pub use crate::transition::{Edits, TransitionEngine, build_transition_payload};
pub use crate::validator::{ValidationResult, Validator, validate, validate_touched};

// Error types
pub use crate::error::{
    AmbiguousBranch, CatalogConversionError, CatalogError, KeyError, PathError, SchemaDrift,
    SessionError, SnapshotError, StoreError, TransitionError, ValidationError, Violation,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
