use crate::catalog::Catalog;
use crate::error::TransitionError;
use crate::key::FieldKey;
use crate::lead::{Lead, LeadData, TransitionPayload};
use crate::path::{DisplayPath, Path, PathDetector};
use crate::resolver::{FieldSpec, resolve_fields};
use crate::validator::Validator;
use ahash::{AHashMap, AHashSet};
use serde_json::Value;

/// New values keyed by structured field key.
pub type Edits = AHashMap<FieldKey, Value>;

/// Turns a lead, a working path and an edit map into the payload to persist.
///
/// Pure: nothing is written anywhere. The caller hands the payload to its
/// `LeadStore` only when this returns `Ok`.
pub struct TransitionEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> TransitionEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn build(
        &self,
        lead: &Lead,
        path: &Path,
        edited: &Edits,
    ) -> Result<TransitionPayload, TransitionError> {
        path.check(self.catalog)?;
        let fields = resolve_fields(path, self.catalog);
        let writes = self.collect_writes(path, edited)?;
        let merged = self.merge(&lead.data, &writes, &fields);

        let detected = PathDetector::new(self.catalog, &merged).detect(path.root_id())?;
        if detected != *path {
            return Err(TransitionError::PathMismatch {
                expected: owned_ids(path),
                detected: owned_ids(&detected),
            });
        }

        let validator = Validator::new(self.catalog);
        if self.is_in_place_edit(lead, path)? {
            let touched: AHashSet<FieldKey> = edited.keys().cloned().collect();
            validator.validate_touched(path, &merged, &touched)?;
        } else {
            validator.validate(path, &merged)?;
        }

        let drift = self.catalog.unrecognized_keys(&merged);
        if !drift.is_empty() {
            tracing::warn!(
                lead_id = %lead.id,
                keys = ?drift.keys,
                "keeping keys the catalog does not recognize"
            );
        }

        tracing::debug!(
            lead_id = %lead.id,
            path = %DisplayPath::new(path, self.catalog),
            "transition payload built"
        );
        Ok(TransitionPayload {
            status_id: path.effective_status().to_string(),
            data: merged,
        })
    }

    /// An edit that neither moves the lead nor changes its branch.
    fn is_in_place_edit(&self, lead: &Lead, path: &Path) -> Result<bool, TransitionError> {
        if lead.current_status_id != path.effective_status() {
            return Ok(false);
        }
        let persisted = PathDetector::new(self.catalog, &lead.data).detect(path.root_id())?;
        Ok(persisted == *path)
    }

    /// Branch selections carried by the path, then the edits, in a stable order.
    fn collect_writes(
        &self,
        path: &Path,
        edited: &Edits,
    ) -> Result<Vec<(FieldKey, Value)>, TransitionError> {
        let mut writes = Vec::with_capacity(edited.len() + path.len());

        for (depth, step) in path.steps().iter().enumerate().skip(1) {
            let Some(via) = &step.via else { continue };
            let key = path.key_for(depth - 1, &via.field);
            let selected = Value::String(via.option.clone());
            if let Some(value) = edited.get(&key) {
                if *value != selected {
                    return Err(TransitionError::BranchConflict {
                        key: self.catalog.namespacer().encode(&key),
                        path_option: via.option.clone(),
                        edited: value.clone(),
                    });
                }
            }
            writes.push((key, selected));
        }

        self.check_unfollowed(path, edited)?;

        let mut rest: Vec<(&FieldKey, &Value)> = edited
            .iter()
            .filter(|(key, _)| !writes.iter().any(|(written, _)| written == *key))
            .collect();
        rest.sort_by(|a, b| a.0.cmp(b.0));
        writes.extend(rest.into_iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(writes)
    }

    /// Rejects edits that choose a child the path skips.
    ///
    /// Checked on every non-final status: the branching fields declared before
    /// the one the path follows, and all branching fields of the last status.
    fn check_unfollowed(&self, path: &Path, edited: &Edits) -> Result<(), TransitionError> {
        for (depth, step) in path.steps().iter().enumerate() {
            let status = self.catalog.require(&step.status_id)?;
            if status.is_final_status {
                continue;
            }
            let followed = path
                .steps()
                .get(depth + 1)
                .and_then(|next| next.via.as_ref())
                .map(|via| via.field.as_str());

            for field in status
                .branching_fields()
                .take_while(|f| Some(f.name.as_str()) != followed)
            {
                let key = path.key_for(depth, &field.name);
                let Some(option) = edited.get(&key).and_then(Value::as_str) else {
                    continue;
                };
                if let Some(child_id) = field.child_for(option) {
                    return Err(TransitionError::UnfollowedBranch {
                        key: self.catalog.namespacer().encode(&key),
                        option: option.to_string(),
                        child_id: child_id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Persisted data with `writes` laid over it.
    ///
    /// Untouched keys, including those of abandoned branches and keys the
    /// catalog no longer knows, are kept verbatim. A namespaced write on the
    /// path also sets its plain alias, unless another field on the path uses
    /// that name at a different depth.
    fn merge(&self, persisted: &LeadData, writes: &[(FieldKey, Value)], fields: &[FieldSpec]) -> LeadData {
        let namespacer = self.catalog.namespacer();
        let mut merged = persisted.clone();

        for (key, value) in writes {
            merged.insert(namespacer.encode(key), value.clone());

            let on_path = fields.iter().any(|f| f.key == *key);
            if key.is_namespaced() && on_path && !alias_claimed(key, fields) {
                merged.insert(key.field.clone(), value.clone());
            }
        }
        merged
    }
}

/// Whether a field at another depth of the path shares `key`'s plain name.
fn alias_claimed(key: &FieldKey, fields: &[FieldSpec]) -> bool {
    fields
        .iter()
        .any(|f| f.key.field == key.field && f.key.depth() != key.depth())
}

fn owned_ids(path: &Path) -> Vec<String> {
    path.status_ids().into_iter().map(str::to_string).collect()
}

/// Builds the payload for moving `lead` onto `path` with `edited` values.
pub fn build_transition_payload(
    lead: &Lead,
    path: &Path,
    edited: &Edits,
    catalog: &Catalog,
) -> Result<TransitionPayload, TransitionError> {
    TransitionEngine::new(catalog).build(lead, path, edited)
}
