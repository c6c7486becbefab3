//! PostgreSQL dialect.

use super::{base_type_template, Clause, SchemaDialect};
use crate::catalog::{type_names, FieldType};

/// PostgreSQL DDL: serial keys and `COMMENT ON` statements after the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SchemaDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn type_template(&self, type_name: &str) -> Option<&'static str> {
        match type_name {
            type_names::DATETIME => Some("TIMESTAMPTZ"),
            type_names::JSON => Some("JSONB"),
            type_names::UUID => Some("UUID"),
            type_names::BINARY => Some("BYTEA"),
            other => base_type_template(other),
        }
    }

    fn primary_key_column(&self, column: &str, field_type: &FieldType, _comment: &str) -> Option<String> {
        let serial = if field_type.is_a(type_names::SMALL_INT) {
            "SMALLSERIAL"
        } else if field_type.is_a(type_names::INT) {
            "SERIAL"
        } else if field_type.is_a(type_names::BIG_INT) {
            "BIGSERIAL"
        } else {
            return None;
        };
        Some(format!("{} {serial} NOT NULL PRIMARY KEY", self.quote(column)))
    }

    fn escape_comment(&self, comment: &str) -> String {
        comment.replace('\'', "''")
    }

    fn table_comment(&self, table: &str, comment: &str) -> Clause {
        Clause::Trailing(format!(
            "COMMENT ON TABLE {} IS '{}';",
            self.quote(table),
            self.escape_comment(comment)
        ))
    }

    fn column_comment(&self, table: &str, column: &str, comment: &str) -> Clause {
        Clause::Trailing(format!(
            "COMMENT ON COLUMN {}.{} IS '{}';",
            self.quote(table),
            self.quote(column),
            self.escape_comment(comment)
        ))
    }
}
