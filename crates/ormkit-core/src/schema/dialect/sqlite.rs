//! SQLite dialect.

use super::{base_type_template, SchemaDialect};
use crate::catalog::{type_names, FieldType};

/// SQLite DDL: inline `/* */` comments and `AUTOINCREMENT` integer keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SchemaDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_template(&self, type_name: &str) -> Option<&'static str> {
        match type_name {
            type_names::BOOLEAN => Some("INT"),
            type_names::FLOAT => Some("REAL"),
            type_names::DECIMAL => Some("VARCHAR(40)"),
            other => base_type_template(other),
        }
    }

    fn primary_key_column(&self, column: &str, field_type: &FieldType, comment: &str) -> Option<String> {
        field_type.is_integer().then(|| {
            format!(
                "{} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL{comment}",
                self.quote(column)
            )
        })
    }
}
