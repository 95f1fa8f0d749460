use super::definition::StatusDefinition;
use crate::error::CatalogConversionError;

/// A trait for custom catalog formats that can be converted into leadpath's
/// `StatusDefinition` list.
///
/// This is the extension point for feeding a catalog from whatever the
/// administration backend returns. Implement it on your own structs and pass
/// the result to `Catalog::builder`.
///
/// # Example
///
/// ```rust,no_run
/// use leadpath::prelude::*;
/// use std::result::Result;
///
/// // A backend that stores each status with its branch choices inline.
/// struct AdminStatus {
///     key: String,
///     label: String,
///     choices: Vec<(String, String)>,
/// }
///
/// struct AdminCatalog {
///     statuses: Vec<AdminStatus>,
/// }
///
/// impl IntoCatalog for AdminCatalog {
///     fn into_catalog(self) -> Result<Vec<StatusDefinition>, CatalogConversionError> {
///         let mut definitions = Vec::new();
///         for (i, status) in self.statuses.into_iter().enumerate() {
///             let mut outcome = FieldDefinition::new("Outcome", FieldType::Select);
///             for (option, child) in &status.choices {
///                 outcome = outcome.with_child(option, child);
///                 outcome.options.push(option.clone());
///             }
///             let mut definition = StatusDefinition::new(&status.key, &status.label);
///             if !status.choices.is_empty() {
///                 definition = definition.with_field(outcome);
///             }
///             if i == 0 {
///                 definition = definition.default_status();
///             }
///             definitions.push(definition);
///         }
///         Ok(definitions)
///     }
/// }
/// ```
pub trait IntoCatalog {
    /// Consumes the object and converts it into catalog status definitions.
    fn into_catalog(self) -> Result<Vec<StatusDefinition>, CatalogConversionError>;
}

impl IntoCatalog for Vec<StatusDefinition> {
    fn into_catalog(self) -> Result<Vec<StatusDefinition>, CatalogConversionError> {
        Ok(self)
    }
}

impl IntoCatalog for &str {
    /// Parses a JSON array of status definitions.
    fn into_catalog(self) -> Result<Vec<StatusDefinition>, CatalogConversionError> {
        serde_json::from_str(self).map_err(|e| CatalogConversionError::JsonParseError(e.to_string()))
    }
}
