use crate::catalog::Catalog;
use crate::error::{ValidationError, Violation};
use crate::key::FieldKey;
use crate::lead::LeadData;
use crate::path::Path;
use crate::resolver::{FieldSpec, resolve_fields};
use ahash::AHashSet;

/// `Ok(())` when every required field has a value.
pub type ValidationResult = Result<(), ValidationError>;

/// Checks required fields against a candidate value map.
///
/// Values are looked up under the encoded storage key only; a plain alias
/// never satisfies a nested field.
pub struct Validator<'a> {
    catalog: &'a Catalog,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Validates every required field on `path`.
    pub fn validate(&self, path: &Path, values: &LeadData) -> ValidationResult {
        let fields = resolve_fields(path, self.catalog);
        self.check_fields(&fields, values)
    }

    /// Validates only the required fields whose keys are in `touched`.
    pub fn validate_touched(
        &self,
        path: &Path,
        values: &LeadData,
        touched: &AHashSet<FieldKey>,
    ) -> ValidationResult {
        let fields: Vec<FieldSpec> = resolve_fields(path, self.catalog)
            .into_iter()
            .filter(|f| touched.contains(&f.key))
            .collect();
        self.check_fields(&fields, values)
    }

    /// Collects a violation for every required field without a value.
    pub fn check_fields(&self, fields: &[FieldSpec], values: &LeadData) -> ValidationResult {
        let namespacer = self.catalog.namespacer();
        let violations: Vec<Violation> = fields
            .iter()
            .filter(|f| f.required)
            .filter_map(|f| {
                let key = namespacer.encode(&f.key);
                let present = values
                    .get(&key)
                    .is_some_and(|value| f.field_type.is_present(value));
                (!present).then(|| Violation {
                    status_id: f.status_id.clone(),
                    status_name: f.status_name.clone(),
                    field_name: f.display_name.clone(),
                    key,
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(missing = violations.len(), "validation failed");
            Err(ValidationError { violations })
        }
    }
}

/// Validates every required field on `path` against `values`.
pub fn validate(path: &Path, values: &LeadData, catalog: &Catalog) -> ValidationResult {
    Validator::new(catalog).validate(path, values)
}

/// Validates only the touched required fields on `path`.
pub fn validate_touched(
    path: &Path,
    values: &LeadData,
    touched: &AHashSet<FieldKey>,
    catalog: &Catalog,
) -> ValidationResult {
    Validator::new(catalog).validate_touched(path, values, touched)
}
