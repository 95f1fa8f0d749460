use super::Path;
use crate::catalog::{Catalog, FieldDefinition, StatusDefinition};
use crate::error::{AmbiguousBranch, PathError};
use crate::key::BranchStep;
use crate::lead::LeadData;
use ahash::AHashSet;
use serde_json::Value;

/// A detected path together with the branch values that could not be followed.
#[derive(Debug, Clone, PartialEq)]
pub struct PathReport {
    pub path: Path,
    pub ambiguous: Vec<AmbiguousBranch>,
}

/// What the data says about one branching field.
enum BranchValue<'d> {
    /// Nothing usable is stored.
    Unset,
    /// A declared option; `child` is `None` for options that open nothing.
    Chosen { option: &'d str, child: Option<&'d str> },
    /// A value that is not one of the field's options.
    Ambiguous { key: String, found: &'d Value },
}

/// Reconstructs the branch a lead occupies from its flat data.
pub struct PathDetector<'a> {
    catalog: &'a Catalog,
    data: &'a LeadData,
    /// Field names stored under at least one namespaced key.
    namespaced_fields: AHashSet<&'a str>,
}

impl<'a> PathDetector<'a> {
    pub fn new(catalog: &'a Catalog, data: &'a LeadData) -> Self {
        let separator = catalog.namespacer().separator();
        let namespaced_fields = data
            .keys()
            .filter_map(|key| key.rsplit_once(separator).map(|(_, field)| field))
            .collect();
        Self {
            catalog,
            data,
            namespaced_fields,
        }
    }

    pub fn detect(&self, root_id: &str) -> Result<Path, PathError> {
        self.detect_with_report(root_id).map(|report| report.path)
    }

    /// Detects the path and collects every ambiguous branch value met on the way.
    pub fn detect_with_report(&self, root_id: &str) -> Result<PathReport, PathError> {
        let root = self.catalog.require(root_id)?;
        let mut report = PathReport {
            path: Path::root(root_id),
            ambiguous: Vec::new(),
        };
        self.descend(root, &mut report);
        Ok(report)
    }

    /// Follows the first branching field with a stored value, one level per call.
    fn descend(&self, status: &'a StatusDefinition, report: &mut PathReport) {
        if status.is_final_status || report.path.len() > self.catalog.options().max_depth {
            return;
        }
        let depth = report.path.len() - 1;

        for field in status.branching_fields() {
            match self.branch_value(depth, field, &report.path) {
                BranchValue::Unset => continue,
                BranchValue::Chosen { option, child } => {
                    let Some(child) = child.and_then(|id| self.catalog.status(id)) else {
                        return;
                    };
                    tracing::debug!(
                        parent = %status.id,
                        field = %field.name,
                        option,
                        child = %child.id,
                        "following branch"
                    );
                    report.path.push(&child.id, BranchStep::new(&field.name, option));
                    self.descend(child, report);
                    return;
                }
                BranchValue::Ambiguous { key, found } => {
                    let ambiguous = AmbiguousBranch {
                        status_id: status.id.clone(),
                        field: field.name.clone(),
                        key,
                        found: found.clone(),
                    };
                    tracing::warn!(%ambiguous, "branch value matches no option, stopping descent");
                    report.ambiguous.push(ambiguous);
                    return;
                }
            }
        }
    }

    /// Reads a branching field's value, namespaced key first, then its plain alias.
    ///
    /// The alias is shared by every branch. Once the field is stored under any
    /// namespaced key, the alias may belong to another branch and is ignored.
    fn branch_value(&self, depth: usize, field: &'a FieldDefinition, path: &Path) -> BranchValue<'a> {
        let namespaced = self.catalog.namespacer().key_at(path, depth, &field.name);
        let stored = self
            .present(&namespaced, field)
            .map(|value| (namespaced.clone(), value))
            .or_else(|| {
                (depth > 0 && !self.namespaced_fields.contains(field.name.as_str()))
                    .then(|| self.present(&field.name, field))
                    .flatten()
                    .map(|value| (field.name.clone(), value))
            });

        let Some((key, value)) = stored else {
            return BranchValue::Unset;
        };
        match value.as_str() {
            Some(option) if field.has_option(option) => BranchValue::Chosen {
                option,
                child: field.child_for(option),
            },
            _ => BranchValue::Ambiguous { key, found: value },
        }
    }

    fn present(&self, key: &str, field: &FieldDefinition) -> Option<&'a Value> {
        self.data
            .get(key)
            .filter(|value| field.field_type.is_present(value))
    }
}

/// Detects the path a lead occupies below `root_id`.
pub fn detect_path(root_id: &str, data: &LeadData, catalog: &Catalog) -> Result<Path, PathError> {
    PathDetector::new(catalog, data).detect(root_id)
}
