use crate::catalog::{Catalog, StatusId};
use crate::error::PathError;
use crate::key::{BranchStep, FieldKey};
use serde::{Deserialize, Serialize};

mod detector;
mod display;

pub use detector::*;
pub use display::*;

/// One status on a path, with the branch choice that opened it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub status_id: StatusId,
    /// `None` for the root step.
    pub via: Option<BranchStep>,
}

/// The chain of statuses from a root to the deepest status a lead has reached.
///
/// Paths are derived from lead data, never stored. The last step is the
/// effective current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    pub fn root(status_id: &str) -> Self {
        Self {
            steps: vec![PathStep {
                status_id: status_id.to_string(),
                via: None,
            }],
        }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn root_id(&self) -> &str {
        self.steps.first().map_or("", |s| s.status_id.as_str())
    }

    /// The deepest status reached: what gets persisted as the lead's status.
    pub fn effective_status(&self) -> &str {
        self.steps.last().map_or("", |s| s.status_id.as_str())
    }

    pub fn status_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.status_id.as_str()).collect()
    }

    pub fn contains(&self, status_id: &str) -> bool {
        self.steps.iter().any(|s| s.status_id == status_id)
    }

    /// Branch choices leading to the status at `depth`.
    pub fn branches_to(&self, depth: usize) -> Vec<BranchStep> {
        self.steps
            .iter()
            .take(depth + 1)
            .filter_map(|s| s.via.clone())
            .collect()
    }

    /// Structured key of `field` declared on the status at `depth`.
    pub fn key_for(&self, depth: usize, field: &str) -> FieldKey {
        FieldKey::nested(self.branches_to(depth), field)
    }

    /// The first `len` steps of this path.
    pub fn truncated(&self, len: usize) -> Path {
        Path {
            steps: self.steps.iter().take(len.max(1)).cloned().collect(),
        }
    }

    pub(crate) fn push(&mut self, status_id: &str, via: BranchStep) {
        self.steps.push(PathStep {
            status_id: status_id.to_string(),
            via: Some(via),
        });
    }

    /// Path after choosing `option` for the branching `field` of the status at `depth`.
    ///
    /// Everything below `depth` is dropped. An option without a child status
    /// ends the path at `depth`.
    pub fn select(
        &self,
        catalog: &Catalog,
        depth: usize,
        field: &str,
        option: &str,
    ) -> Result<Path, PathError> {
        let step = self.steps.get(depth).ok_or(PathError::DepthOutOfRange {
            depth,
            len: self.len(),
        })?;
        let status = catalog.require(&step.status_id)?;
        let invalid = || PathError::InvalidBranch {
            parent_id: status.id.clone(),
            field: field.to_string(),
            option: option.to_string(),
            status_id: String::new(),
        };

        let definition = status
            .field(field)
            .filter(|f| f.is_branching())
            .ok_or_else(invalid)?;
        if !definition.has_option(option) {
            return Err(invalid());
        }

        let mut selected = self.truncated(depth + 1);
        if let Some(child_id) = definition.child_for(option) {
            if status.is_final_status {
                return Err(PathError::FinalStatusHasChildren(status.id.clone()));
            }
            selected.push(child_id, BranchStep::new(field, option));
        }
        Ok(selected)
    }

    /// Checks that every step exists and is reachable from the one before it.
    pub fn check(&self, catalog: &Catalog) -> Result<(), PathError> {
        let Some(root) = self.steps.first() else {
            return Err(PathError::NotRooted);
        };
        if root.via.is_some() {
            return Err(PathError::NotRooted);
        }
        catalog.require(&root.status_id)?;

        for pair in self.steps.windows(2) {
            let (parent, child) = (&pair[0], &pair[1]);
            let parent_status = catalog.require(&parent.status_id)?;
            catalog.require(&child.status_id)?;
            if parent_status.is_final_status {
                return Err(PathError::FinalStatusHasChildren(parent.status_id.clone()));
            }

            let reachable = child.via.as_ref().is_some_and(|via| {
                parent_status
                    .field(&via.field)
                    .filter(|f| f.is_branching())
                    .and_then(|f| f.child_for(&via.option))
                    == Some(child.status_id.as_str())
            });
            if !reachable {
                let via = child.via.clone().unwrap_or(BranchStep::new("", ""));
                return Err(PathError::InvalidBranch {
                    parent_id: parent.status_id.clone(),
                    field: via.field,
                    option: via.option,
                    status_id: child.status_id.clone(),
                });
            }
        }
        Ok(())
    }
}
