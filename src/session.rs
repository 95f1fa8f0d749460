//! Local editing state for one lead.
//!
//! An `EditSession` owns the lead snapshot it started from, the edits the
//! user has made since, and the working path those edits imply. Nothing
//! reaches a store until [`EditSession::commit`] succeeds; a failed commit
//! leaves every edit in place for a retry.

use crate::catalog::Catalog;
use crate::error::{PathError, SessionError};
use crate::key::FieldKey;
use crate::lead::{Lead, LeadData, LeadStore, TransitionPayload};
use crate::path::{Path, PathDetector};
use crate::resolver::{FieldSpec, resolve_fields};
use crate::transition::{Edits, TransitionEngine};
use crate::validator::{ValidationResult, Validator};
use chrono::Utc;
use serde_json::Value;

pub struct EditSession<'a> {
    catalog: &'a Catalog,
    lead: Lead,
    persisted_path: Path,
    path: Path,
    edits: Edits,
}

impl<'a> EditSession<'a> {
    pub fn new(catalog: &'a Catalog, lead: Lead) -> Result<Self, PathError> {
        let persisted_path = lead.path(catalog)?;
        Ok(Self {
            catalog,
            lead,
            path: persisted_path.clone(),
            persisted_path,
            edits: Edits::new(),
        })
    }

    pub fn lead(&self) -> &Lead {
        &self.lead
    }

    /// The path the current edits lead to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path of the lead as last persisted.
    pub fn persisted_path(&self) -> &Path {
        &self.persisted_path
    }

    pub fn edits(&self) -> &Edits {
        &self.edits
    }

    pub fn is_dirty(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Fields to render for the working path.
    pub fn fields(&self) -> Vec<FieldSpec> {
        resolve_fields(&self.path, self.catalog)
    }

    /// Current value of `key`: the pending edit, else the persisted value.
    pub fn value(&self, key: &FieldKey) -> Option<&Value> {
        self.edits.get(key).or_else(|| {
            self.lead
                .data
                .get(&self.catalog.namespacer().encode(key))
        })
    }

    /// Records a new value and re-derives the working path.
    pub fn set(&mut self, key: FieldKey, value: Value) -> Result<&Path, PathError> {
        self.edits.insert(key, value);
        self.redetect()
    }

    /// Chooses `option` for the branching `field` of the status at `depth`.
    ///
    /// Branch choices pending below `depth` are dropped with the old branch.
    /// Values the lead already stored for the new branch come back into view.
    pub fn select(&mut self, depth: usize, field: &str, option: &str) -> Result<&Path, PathError> {
        let selected = self.path.select(self.catalog, depth, field, option)?;

        for (i, step) in self.path.steps().iter().enumerate().skip(depth + 2) {
            if let Some(via) = &step.via {
                self.edits.remove(&self.path.key_for(i - 1, &via.field));
            }
        }

        let key = selected.key_for(depth, field);
        self.edits.insert(key, Value::String(option.to_string()));
        self.redetect()
    }

    /// Persisted data with pending edits laid over it.
    fn overlay(&self) -> LeadData {
        let namespacer = self.catalog.namespacer();
        let mut data = self.lead.data.clone();
        for (key, value) in &self.edits {
            data.insert(namespacer.encode(key), value.clone());
        }
        data
    }

    fn redetect(&mut self) -> Result<&Path, PathError> {
        let data = self.overlay();
        self.path = PathDetector::new(self.catalog, &data).detect(self.persisted_path.root_id())?;
        Ok(&self.path)
    }

    /// Validates the working path against persisted data plus edits.
    pub fn validate(&self) -> ValidationResult {
        Validator::new(self.catalog).validate(&self.path, &self.overlay())
    }

    /// The payload a commit would write.
    pub fn payload(&self) -> Result<TransitionPayload, SessionError> {
        Ok(TransitionEngine::new(self.catalog).build(&self.lead, &self.path, &self.edits)?)
    }

    /// Discards every pending edit.
    pub fn cancel(&mut self) {
        self.edits.clear();
        self.path = self.persisted_path.clone();
    }

    /// Builds the payload and writes it through `store`.
    ///
    /// On success the session continues from the committed lead. On any
    /// failure the edits and working path are left untouched.
    pub fn commit(&mut self, store: &mut dyn LeadStore) -> Result<TransitionPayload, SessionError> {
        let payload = self.payload()?;
        if let Err(e) = store.write(&self.lead.id, &payload) {
            tracing::warn!(lead_id = %self.lead.id, error = %e, "commit failed, edits kept");
            return Err(SessionError::Persistence(e));
        }

        self.lead = self.lead.committed(&payload, Utc::now());
        self.persisted_path = self.path.clone();
        self.edits.clear();
        tracing::debug!(lead_id = %self.lead.id, status_id = %payload.status_id, "transition committed");
        Ok(payload)
    }
}
