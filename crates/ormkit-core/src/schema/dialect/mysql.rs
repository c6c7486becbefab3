//! MySQL dialect.

use super::{base_type_template, Clause, ForeignKeyRef, SchemaDialect};
use crate::catalog::{type_names, FieldType};

/// Default table character set.
pub const DEFAULT_CHARSET: &str = "utf8mb4";

/// MySQL DDL: backtick quoting, inline `COMMENT`, named foreign-key
/// constraints and `KEY` clauses inside the table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlDialect {
    charset: String,
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

impl MySqlDialect {
    /// Create a dialect using the default character set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table character set.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Table character set.
    pub fn charset(&self) -> &str {
        &self.charset
    }
}

impl SchemaDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self, ident: &str) -> String {
        format!("`{ident}`")
    }

    fn type_template(&self, type_name: &str) -> Option<&'static str> {
        match type_name {
            type_names::TEXT => Some("LONGTEXT"),
            type_names::DATETIME => Some("DATETIME(6)"),
            type_names::FLOAT => Some("DOUBLE"),
            type_names::JSON => Some("JSON"),
            type_names::BINARY => Some("LONGBLOB"),
            other => base_type_template(other),
        }
    }

    fn primary_key_column(&self, column: &str, field_type: &FieldType, comment: &str) -> Option<String> {
        if !field_type.is_integer() {
            return None;
        }
        let ty = self.column_type(field_type).ok()?;
        Some(format!(
            "{} {ty} NOT NULL PRIMARY KEY AUTO_INCREMENT{comment}",
            self.quote(column)
        ))
    }

    fn table_comment(&self, _table: &str, comment: &str) -> Clause {
        Clause::Inline(format!(" COMMENT='{}'", self.escape_comment(comment)))
    }

    fn column_comment(&self, _table: &str, _column: &str, comment: &str) -> Clause {
        Clause::Inline(format!(" COMMENT '{}'", self.escape_comment(comment)))
    }

    fn foreign_key(&self, fk: &ForeignKeyRef<'_>) -> Clause {
        Clause::Inner(format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
            self.quote(fk.constraint),
            self.quote(fk.column),
            self.quote(fk.table),
            self.quote(fk.field),
            fk.on_delete
        ))
    }

    fn unique_constraint(&self, name: &str, columns: &[&str]) -> String {
        format!("UNIQUE KEY {} ({})", self.quote(name), self.quote_list(columns))
    }

    fn index(&self, name: &str, _table: &str, columns: &[&str], _exists: &str) -> Clause {
        Clause::Inner(format!("KEY {} ({})", self.quote(name), self.quote_list(columns)))
    }

    fn table_extra(&self, _table: &str) -> String {
        format!(" CHARACTER SET {}", self.charset)
    }
}
