use crate::catalog::{Catalog, FieldType, StatusId};
use crate::key::FieldKey;
use crate::path::Path;
use itertools::Itertools;

/// A field to display and validate for a path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub display_name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
    pub status_id: StatusId,
    pub status_name: String,
    pub depth: usize,
    /// A select whose options open child statuses.
    pub branches: bool,
}

/// Fields of every status on `path`, root first, in declaration order.
///
/// A branching select is listed like any other field. Its children's fields
/// only appear when the path already descends through it.
pub fn resolve_fields(path: &Path, catalog: &Catalog) -> Vec<FieldSpec> {
    let mut fields = Vec::new();
    collect_fields(path, 0, catalog, &mut fields);
    fields.into_iter().unique_by(|f| f.key.clone()).collect()
}

fn collect_fields(path: &Path, depth: usize, catalog: &Catalog, out: &mut Vec<FieldSpec>) {
    let Some(step) = path.steps().get(depth) else {
        return;
    };
    let Some(status) = catalog.status(&step.status_id) else {
        tracing::warn!(status_id = %step.status_id, depth, "path names an unknown status");
        return;
    };

    let branches = path.branches_to(depth);
    out.extend(status.fields.iter().map(|field| FieldSpec {
        key: FieldKey::nested(branches.clone(), &field.name),
        display_name: field.name.clone(),
        field_type: field.field_type,
        required: field.required,
        options: field.options.clone(),
        status_id: status.id.clone(),
        status_name: status.name.clone(),
        depth,
        branches: field.is_branching(),
    }));

    collect_fields(path, depth + 1, catalog, out);
}
