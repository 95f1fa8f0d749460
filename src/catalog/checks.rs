use super::CatalogOptions;
use super::definition::{FieldType, StatusDefinition, StatusId};
use crate::error::CatalogError;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// Lookup tables produced by a successful catalog check.
pub(super) struct CheckedCatalog {
    pub index: AHashMap<StatusId, usize>,
    pub default_index: usize,
    pub parents: AHashMap<StatusId, Vec<StatusId>>,
}

/// Runs every authoring-time check over the raw definitions.
pub(super) fn check_catalog(
    statuses: &[StatusDefinition],
    options: &CatalogOptions,
) -> Result<CheckedCatalog, CatalogError> {
    if options.separator.is_empty() {
        return Err(CatalogError::EmptySeparator);
    }

    let index = index_statuses(statuses)?;
    let default_index = find_default(statuses)?;
    for status in statuses {
        check_fields(status, &index, &options.separator)?;
    }
    check_depth(statuses, &index, options.max_depth)?;

    Ok(CheckedCatalog {
        parents: parent_links(statuses),
        index,
        default_index,
    })
}

fn index_statuses(
    statuses: &[StatusDefinition],
) -> Result<AHashMap<StatusId, usize>, CatalogError> {
    let mut index = AHashMap::with_capacity(statuses.len());
    for (i, status) in statuses.iter().enumerate() {
        if status.id.is_empty() {
            return Err(CatalogError::EmptyName {
                status_id: status.name.clone(),
                what: "status id",
            });
        }
        if index.insert(status.id.clone(), i).is_some() {
            return Err(CatalogError::DuplicateStatus(status.id.clone()));
        }
    }
    Ok(index)
}

fn find_default(statuses: &[StatusDefinition]) -> Result<usize, CatalogError> {
    let defaults: Vec<usize> = statuses
        .iter()
        .positions(|s| s.is_default_status)
        .collect();
    match defaults.as_slice() {
        [] => Err(CatalogError::NoDefaultStatus),
        [only] => Ok(*only),
        _ => Err(CatalogError::MultipleDefaultStatuses(
            defaults.iter().map(|&i| statuses[i].id.clone()).collect(),
        )),
    }
}

fn check_fields(
    status: &StatusDefinition,
    index: &AHashMap<StatusId, usize>,
    separator: &str,
) -> Result<(), CatalogError> {
    let mut seen = AHashSet::new();
    for field in &status.fields {
        if field.name.is_empty() {
            return Err(CatalogError::EmptyName {
                status_id: status.id.clone(),
                what: "field name",
            });
        }
        if field.name.contains(separator) {
            return Err(CatalogError::SeparatorCollision {
                status_id: status.id.clone(),
                name: field.name.clone(),
                separator: separator.to_string(),
            });
        }
        if !seen.insert(field.name.as_str()) {
            tracing::warn!(
                status_id = %status.id,
                field = %field.name,
                "duplicate field name, the first declaration wins"
            );
        }

        let Some(children) = &field.child_status_by_option else {
            continue;
        };
        if children.is_empty() {
            continue;
        }
        if field.field_type != FieldType::Select {
            return Err(CatalogError::BranchOnNonSelect {
                status_id: status.id.clone(),
                field: field.name.clone(),
            });
        }

        // Sorted so the reported error does not depend on hash order.
        for (option, child_id) in children.iter().sorted() {
            if option.is_empty() {
                return Err(CatalogError::EmptyName {
                    status_id: status.id.clone(),
                    what: "branch option",
                });
            }
            if !field.has_option(option) {
                return Err(CatalogError::UndeclaredOption {
                    status_id: status.id.clone(),
                    field: field.name.clone(),
                    option: option.clone(),
                });
            }
            if option.contains(separator) {
                return Err(CatalogError::SeparatorCollision {
                    status_id: status.id.clone(),
                    name: option.clone(),
                    separator: separator.to_string(),
                });
            }
            if !index.contains_key(child_id.as_str()) {
                return Err(CatalogError::UnknownChildStatus {
                    status_id: status.id.clone(),
                    field: field.name.clone(),
                    option: option.clone(),
                    child_id: child_id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Child status ids a status can branch into. Final statuses branch nowhere.
pub(super) fn child_ids(status: &StatusDefinition) -> impl Iterator<Item = &StatusId> {
    status
        .branching_fields()
        .filter(move |_| !status.is_final_status)
        .flat_map(|f| f.child_status_by_option.iter().flat_map(|m| m.values()))
}

fn parent_links(statuses: &[StatusDefinition]) -> AHashMap<StatusId, Vec<StatusId>> {
    let mut parents: AHashMap<StatusId, Vec<StatusId>> = AHashMap::new();
    for status in statuses {
        for child_id in child_ids(status) {
            let entry = parents.entry(child_id.clone()).or_default();
            if !entry.contains(&status.id) {
                entry.push(status.id.clone());
            }
        }
    }
    parents
}

fn check_depth(
    statuses: &[StatusDefinition],
    index: &AHashMap<StatusId, usize>,
    max_depth: usize,
) -> Result<(), CatalogError> {
    let mut heights = AHashMap::new();
    let mut on_stack = Vec::new();
    for status in statuses {
        let height = branch_height(
            status,
            statuses,
            index,
            max_depth,
            &mut heights,
            &mut on_stack,
        )?;
        if height > max_depth {
            return Err(CatalogError::TooDeep {
                status_id: status.id.clone(),
                max_depth,
            });
        }
    }
    Ok(())
}

/// Longest chain of branch steps below `status`, rejecting cycles on the way.
fn branch_height<'a>(
    status: &'a StatusDefinition,
    statuses: &'a [StatusDefinition],
    index: &AHashMap<StatusId, usize>,
    max_depth: usize,
    heights: &mut AHashMap<&'a str, usize>,
    on_stack: &mut Vec<&'a str>,
) -> Result<usize, CatalogError> {
    if let Some(height) = heights.get(status.id.as_str()) {
        return Ok(*height);
    }
    if on_stack.contains(&status.id.as_str()) {
        return Err(CatalogError::Cycle(status.id.clone()));
    }
    if on_stack.len() > max_depth {
        return Err(CatalogError::TooDeep {
            status_id: on_stack[0].to_string(),
            max_depth,
        });
    }

    on_stack.push(status.id.as_str());
    let mut height = 0;
    for child_id in child_ids(status) {
        let Some(&i) = index.get(child_id.as_str()) else {
            continue;
        };
        let child_height = branch_height(&statuses[i], statuses, index, max_depth, heights, on_stack)?;
        height = height.max(child_height + 1);
    }
    on_stack.pop();

    heights.insert(status.id.as_str(), height);
    Ok(height)
}
