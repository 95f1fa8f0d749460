use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Identifier of a status node in the catalog.
pub type StatusId = String;

/// The input kinds a form field can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Phone,
    Number,
    Date,
    Datetime,
    Time,
    Textarea,
    Select,
    Checkbox,
}

impl FieldType {
    /// Whether the field carries an `options` list.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Checkbox)
    }

    /// Whether `value` counts as filled in for a field of this type.
    ///
    /// Strings must be non-blank, lists non-empty, and a checkbox stored as a
    /// single boolean must be ticked. Anything else only has to be non-null.
    pub fn is_present(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match (self, value) {
            (_, Value::Null) => false,
            (_, Value::String(s)) => !s.trim().is_empty(),
            (_, Value::Array(items)) => !items.is_empty(),
            (FieldType::Checkbox, Value::Bool(checked)) => *checked,
            _ => true,
        }
    }
}

/// A single named, typed datum a status requires or offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type", alias = "fieldType")]
    pub field_type: FieldType,
    #[serde(default, alias = "isRequired")]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    /// Option value -> child status id. Only present on branching selects.
    #[serde(default)]
    pub child_status_by_option: Option<AHashMap<String, StatusId>>,
}

impl FieldDefinition {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required: false,
            options: Vec::new(),
            child_status_by_option: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    /// Maps `option` to the child status opened when it is chosen.
    pub fn with_child(mut self, option: &str, child_id: &str) -> Self {
        self.child_status_by_option
            .get_or_insert_with(AHashMap::new)
            .insert(option.to_string(), child_id.to_string());
        self
    }

    /// A select whose options open child statuses.
    pub fn is_branching(&self) -> bool {
        self.field_type == FieldType::Select
            && self
                .child_status_by_option
                .as_ref()
                .is_some_and(|children| !children.is_empty())
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Child status opened by `option`, looked up by value.
    pub fn child_for(&self, option: &str) -> Option<&str> {
        self.child_status_by_option
            .as_ref()
            .and_then(|children| children.get(option))
            .map(String::as_str)
    }
}

/// A node in the workflow tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDefinition {
    #[serde(alias = "_id")]
    pub id: StatusId,
    pub name: String,
    #[serde(default, alias = "formFields")]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub is_default_status: bool,
    #[serde(default)]
    pub is_final_status: bool,
}

impl StatusDefinition {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            fields: Vec::new(),
            is_default_status: false,
            is_final_status: false,
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn default_status(mut self) -> Self {
        self.is_default_status = true;
        self
    }

    pub fn final_status(mut self) -> Self {
        self.is_final_status = true;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Branching selects in declaration order.
    pub fn branching_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.is_branching())
    }
}
