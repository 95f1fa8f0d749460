use crate::error::{CatalogConversionError, CatalogError, PathError, SchemaDrift};
use crate::key::{FieldKey, Namespacer};
use crate::lead::LeadData;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

mod checks;
pub mod conversion;
pub mod definition;
pub mod snapshot;

pub use conversion::*;
pub use definition::*;
pub use snapshot::*;

pub const DEFAULT_SEPARATOR: &str = "_";
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Settings fixed once per catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogOptions {
    /// Joins branch segments in namespaced storage keys.
    pub separator: String,
    /// Deepest branch level a catalog may declare.
    pub max_depth: usize,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A validated, immutable set of statuses.
///
/// Built once per edit session and shared read-only by every engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    statuses: Vec<StatusDefinition>,
    index: AHashMap<StatusId, usize>,
    parents: AHashMap<StatusId, Vec<StatusId>>,
    field_names: AHashSet<String>,
    default_index: usize,
    options: CatalogOptions,
    namespacer: Namespacer,
}

pub struct CatalogBuilder {
    source: Result<Vec<StatusDefinition>, CatalogConversionError>,
    options: CatalogOptions,
}

impl CatalogBuilder {
    pub fn new(source: impl IntoCatalog) -> Self {
        Self {
            source: source.into_catalog(),
            options: CatalogOptions::default(),
        }
    }

    pub fn with_separator(mut self, separator: &str) -> Self {
        self.options.separator = separator.to_string();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    pub fn with_options(mut self, options: CatalogOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        let statuses = self.source?;
        let checked = checks::check_catalog(&statuses, &self.options)?;
        let field_names = statuses
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| f.name.clone()))
            .collect();

        tracing::debug!(
            statuses = statuses.len(),
            default = %statuses[checked.default_index].id,
            separator = %self.options.separator,
            "catalog built"
        );

        Ok(Catalog {
            namespacer: Namespacer::new(&self.options.separator),
            statuses,
            index: checked.index,
            parents: checked.parents,
            field_names,
            default_index: checked.default_index,
            options: self.options,
        })
    }
}

impl Catalog {
    pub fn builder(source: impl IntoCatalog) -> CatalogBuilder {
        CatalogBuilder::new(source)
    }

    pub fn status(&self, id: &str) -> Option<&StatusDefinition> {
        self.index.get(id).map(|&i| &self.statuses[i])
    }

    /// Like [`Catalog::status`], but an unknown id is an error.
    pub fn require(&self, id: &str) -> Result<&StatusDefinition, PathError> {
        self.status(id)
            .ok_or_else(|| PathError::UnknownStatus(id.to_string()))
    }

    pub fn default_status(&self) -> &StatusDefinition {
        &self.statuses[self.default_index]
    }

    /// All statuses in declaration order.
    pub fn statuses(&self) -> &[StatusDefinition] {
        &self.statuses
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    pub fn namespacer(&self) -> &Namespacer {
        &self.namespacer
    }

    /// Statuses that branch directly into `id`.
    pub fn parents_of(&self, id: &str) -> &[StatusId] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Statuses no branch leads into, in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = &StatusDefinition> {
        self.statuses
            .iter()
            .filter(|s| self.parents_of(&s.id).is_empty())
    }

    /// Roots from which `id` can be reached, the default status first.
    pub fn roots_of<'a>(&'a self, id: &'a str) -> Vec<&'a str> {
        let mut seen: AHashSet<&str> = AHashSet::new();
        let mut pending = vec![id];
        let mut roots = Vec::new();

        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            let parents = self.parents_of(current);
            if parents.is_empty() {
                roots.push(current);
            }
            pending.extend(parents.iter().map(String::as_str));
        }

        let default_id = self.default_status().id.as_str();
        roots.sort_by_key(|root| (*root != default_id, self.index.get(*root).copied()));
        roots
    }

    /// Whether a stored key belongs to some field of this catalog.
    ///
    /// Plain keys must name a field somewhere. Namespaced keys must follow
    /// real branches from some status down to a status declaring the field.
    pub fn recognizes(&self, key: &str) -> bool {
        if self.field_names.contains(key) {
            return true;
        }
        match self.namespacer.parse(key) {
            Ok(parsed) if parsed.is_namespaced() => {
                self.statuses.iter().any(|start| self.follows(start, &parsed))
            }
            _ => false,
        }
    }

    fn follows(&self, start: &StatusDefinition, key: &FieldKey) -> bool {
        let mut current = start;
        for step in &key.branches {
            if current.is_final_status {
                return false;
            }
            let next = current
                .branching_fields()
                .find(|f| f.name == step.field)
                .and_then(|f| f.child_for(&step.option))
                .and_then(|id| self.status(id));
            match next {
                Some(status) => current = status,
                None => return false,
            }
        }
        current.field(&key.field).is_some()
    }

    /// Keys in `data` this catalog cannot account for, sorted.
    pub fn unrecognized_keys(&self, data: &LeadData) -> SchemaDrift {
        let mut keys: Vec<String> = data
            .keys()
            .filter(|key| !self.recognizes(key))
            .cloned()
            .collect();
        keys.sort();
        SchemaDrift { keys }
    }
}
