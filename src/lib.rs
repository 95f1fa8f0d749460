//! # Leadpath - Hierarchical Status Paths for Lead Forms
//!
//! **Leadpath** keeps a lead's status, branch and data consistent while a
//! user edits it. A lead sits in a tree of statuses: a select field on one
//! status can open a child status depending on the option chosen, and every
//! field of a nested status is stored under a key that records the branches
//! taken to reach it.
//!
//! ## Core Workflow
//!
//! 1.  **Load the Catalog**: Bring the admin's status definitions in through
//!     the `IntoCatalog` trait and build a validated `Catalog`.
//! 2.  **Detect the Path**: Reconstruct the branch a lead occupies from its
//!     flat data with `detect_path` or `Lead::path`.
//! 3.  **Edit**: Open an `EditSession`, set values and choose branches. The
//!     working path follows the edits; nothing is written yet.
//! 4.  **Commit**: The `TransitionEngine` merges edits into the persisted data
//!     without losing any key, validates the required fields, and hands one
//!     `TransitionPayload` to your `LeadStore`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use leadpath::prelude::*;
//! use serde_json::json;
//! use std::result::Result;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::builder(vec![
//!         StatusDefinition::new("new", "New")
//!             .default_status()
//!             .with_field(
//!                 FieldDefinition::new("Outcome", FieldType::Select)
//!                     .required()
//!                     .with_options(&["Interested", "Not Interested"])
//!                     .with_child("Interested", "b"),
//!             ),
//!         StatusDefinition::new("b", "Status B").with_field(
//!             FieldDefinition::new("Next Meeting Date", FieldType::Date).required(),
//!         ),
//!     ])
//!     .build()?;
//!
//!     let mut store = MemoryLeadStore::new();
//!     let lead = Lead::new("lead-1", &catalog);
//!     store.insert(lead.clone());
//!
//!     let mut session = EditSession::new(&catalog, lead)?;
//!     session.select(0, "Outcome", "Interested")?;
//!     let meeting = session.path().key_for(1, "Next Meeting Date");
//!     session.set(meeting, json!("2026-11-02"))?;
//!
//!     let payload = session.commit(&mut store)?;
//!     println!("-> {} {:?}", payload.status_id, payload.data);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod key;
pub mod lead;
pub mod path;
pub mod prelude;
pub mod resolver;
pub mod session;
pub mod transition;
pub mod validator;
