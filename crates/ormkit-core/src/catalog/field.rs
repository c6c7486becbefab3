//! Field definitions for models.

use ormkit_proto::Value;
use serde::{Deserialize, Serialize};

use super::types::FieldType;

/// A data field (a column) within a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Column name, when it differs from the field name.
    #[serde(default)]
    pub source_field: Option<String>,
    /// Field data type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether this is the primary key.
    #[serde(default)]
    pub pk: bool,
    /// Whether the column accepts NULL.
    #[serde(default)]
    pub null: bool,
    /// Whether the column is unique.
    #[serde(default)]
    pub unique: bool,
    /// Whether the column should be indexed.
    #[serde(default)]
    pub index: bool,
    /// Human readable description, emitted as a column comment.
    #[serde(default)]
    pub description: Option<String>,
    /// Default value if not provided.
    #[serde(default)]
    pub default: Option<Value>,
    /// Name of the foreign-key relation this column backs.
    #[serde(default)]
    pub reference: Option<String>,
}

impl FieldDef {
    /// Create a new non-nullable field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            source_field: None,
            field_type,
            pk: false,
            null: false,
            unique: false,
            index: false,
            description: None,
            default: None,
            reference: None,
        }
    }

    /// Create a primary-key field.
    pub fn primary_key(name: impl Into<String>, field_type: FieldType) -> Self {
        let mut field = Self::new(name, field_type);
        field.pk = true;
        field
    }

    /// Set the column name.
    pub fn with_source_field(mut self, column: impl Into<String>) -> Self {
        self.source_field = Some(column.into());
        self
    }

    /// Allow NULL values.
    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Mark as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark as indexed.
    pub fn with_index(mut self) -> Self {
        self.index = true;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Column name in storage.
    pub fn column(&self) -> &str {
        self.source_field.as_deref().unwrap_or(&self.name)
    }

    /// Check if this column backs a foreign-key relation.
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_def_builder() {
        let field = FieldDef::new("email", FieldType::char(200))
            .with_source_field("email_address")
            .unique()
            .with_index()
            .with_description("Login address");

        assert_eq!(field.name, "email");
        assert_eq!(field.column(), "email_address");
        assert!(field.unique);
        assert!(field.index);
        assert!(!field.null);
        assert!(!field.is_reference());
    }

    #[test]
    fn test_primary_key_and_default() {
        let id = FieldDef::primary_key("id", FieldType::int());
        assert!(id.pk);
        assert_eq!(id.column(), "id");

        let active = FieldDef::new("active", FieldType::boolean())
            .nullable()
            .with_default(true);
        assert!(active.null);
        assert_eq!(active.default, Some(Value::Bool(true)));
    }
}
