//! Model definitions.

use serde::{Deserialize, Serialize};

use super::field::FieldDef;
use super::relation::RelationDef;

/// A model definition (one table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    /// Model name (unique within the catalog).
    pub name: String,
    /// Table name. Defaults to the lowercased model name.
    #[serde(default)]
    pub table: String,
    /// Table description, emitted as the table comment.
    #[serde(default)]
    pub description: Option<String>,
    /// Data fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Relations in declaration order.
    #[serde(default)]
    pub relations: Vec<RelationDef>,
    /// Groups of fields that are unique together.
    #[serde(default)]
    pub unique_together: Vec<Vec<String>>,
    /// Groups of fields indexed together.
    #[serde(default)]
    pub indexes: Vec<Vec<String>>,
}

impl ModelDef {
    /// Create a new model definition.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table: name.to_lowercase(),
            name,
            description: None,
            fields: Vec::new(),
            relations: Vec::new(),
            unique_together: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Override the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field to the model.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Add a relation.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    /// Add a foreign key to `target` named `name`.
    pub fn with_foreign_key(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.with_relation(RelationDef::foreign_key(name, target))
    }

    /// Add a one-to-one reference to `target` named `name`.
    pub fn with_one_to_one(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.with_relation(RelationDef::one_to_one(name, target))
    }

    /// Add a many-to-many relation to `target` named `name`.
    pub fn with_many_to_many(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.with_relation(RelationDef::many_to_many(name, target))
    }

    /// Declare a group of fields unique together.
    pub fn with_unique_together<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_together
            .push(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Declare a composite index.
    pub fn with_index<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes.push(fields.into_iter().map(Into::into).collect());
        self
    }
}
