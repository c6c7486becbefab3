//! SQL dialects for schema generation.
//!
//! A [`SchemaDialect`] decides identifier quoting, the column type for each
//! field type, primary-key shorthands, and where comments, foreign keys and
//! indexes are placed. Default method bodies produce ANSI-style DDL with
//! inline `/* */` comments; backends override what they do differently.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::{MySqlDialect, DEFAULT_CHARSET};
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::catalog::{type_names, FieldType};
use crate::error::Error;

/// Placement of a generated clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Appended to the column or table definition text.
    Inline(String),
    /// An extra entry in the table body.
    Inner(String),
    /// A separate statement following the table.
    Trailing(String),
}

/// A foreign-key reference from one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyRef<'a> {
    /// Generated constraint name.
    pub constraint: &'a str,
    /// Referencing column.
    pub column: &'a str,
    /// Referenced table.
    pub table: &'a str,
    /// Referenced column.
    pub field: &'a str,
    /// `ON DELETE` policy.
    pub on_delete: &'a str,
    /// Inline comment text, possibly empty.
    pub comment: &'a str,
}

/// Type templates shared by every dialect unless overridden.
pub fn base_type_template(type_name: &str) -> Option<&'static str> {
    let template = match type_name {
        type_names::BOOLEAN => "BOOL",
        type_names::INT => "INT",
        type_names::SMALL_INT => "SMALLINT",
        type_names::BIG_INT => "BIGINT",
        type_names::TEXT => "TEXT",
        type_names::CHAR => "VARCHAR({max_length})",
        type_names::DATETIME => "TIMESTAMP",
        type_names::DECIMAL => "DECIMAL({max_digits},{decimal_places})",
        type_names::TIME_DELTA => "BIGINT",
        type_names::DATE => "DATE",
        type_names::FLOAT => "DOUBLE PRECISION",
        type_names::JSON => "TEXT",
        type_names::UUID => "CHAR(36)",
        type_names::BINARY => "BLOB",
        _ => return None,
    };
    Some(template)
}

/// Backslash-escape quotes and control characters.
pub fn escape_backslash(comment: &str) -> String {
    let mut out = String::with_capacity(comment.len());
    for ch in comment.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            other => out.push(other),
        }
    }
    out
}

/// Backend-specific DDL rendering.
pub trait SchemaDialect {
    /// Dialect name, for logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier.
    fn quote(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }

    /// Column type template for a field type name, if mapped.
    fn type_template(&self, type_name: &str) -> Option<&'static str> {
        base_type_template(type_name)
    }

    /// Column type for `field_type`.
    ///
    /// Walks the type hierarchy leaf first until a template is found, then
    /// fills in `{max_length}`, `{max_digits}` and `{decimal_places}`.
    fn column_type(&self, field_type: &FieldType) -> Result<String, Error> {
        let template = field_type
            .lineage()
            .find_map(|ty| self.type_template(&ty.name))
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "no {} column type for field type {}",
                    self.name(),
                    field_type.name
                ))
            })?;

        let mut rendered = template.to_string();
        if rendered.contains("{max_length}") {
            let max_length = field_type.max_length().ok_or_else(|| {
                Error::Configuration(format!("{} requires max_length", field_type.name))
            })?;
            rendered = rendered.replace("{max_length}", &max_length.to_string());
        }
        if rendered.contains("{max_digits}") {
            let spec = field_type.decimal_spec().ok_or_else(|| {
                Error::Configuration(format!(
                    "{} requires max_digits and decimal_places",
                    field_type.name
                ))
            })?;
            rendered = rendered
                .replace("{max_digits}", &spec.max_digits.to_string())
                .replace("{decimal_places}", &spec.decimal_places.to_string());
        }
        Ok(rendered)
    }

    /// Complete definition of a generated primary-key column, if the dialect
    /// has a shorthand for this type.
    fn primary_key_column(
        &self,
        _column: &str,
        _field_type: &FieldType,
        _comment: &str,
    ) -> Option<String> {
        None
    }

    /// Escape comment text.
    fn escape_comment(&self, comment: &str) -> String {
        escape_backslash(comment)
    }

    /// Table comment.
    fn table_comment(&self, _table: &str, comment: &str) -> Clause {
        Clause::Inline(format!(" /* {} */", self.escape_comment(comment)))
    }

    /// Column comment.
    fn column_comment(&self, _table: &str, _column: &str, comment: &str) -> Clause {
        Clause::Inline(format!(" /* {} */", self.escape_comment(comment)))
    }

    /// Foreign-key reference of a column.
    fn foreign_key(&self, fk: &ForeignKeyRef<'_>) -> Clause {
        Clause::Inline(format!(
            " REFERENCES {} ({}) ON DELETE {}{}",
            self.quote(fk.table),
            self.quote(fk.field),
            fk.on_delete,
            fk.comment
        ))
    }

    /// Unique constraint entry in the table body.
    fn unique_constraint(&self, name: &str, columns: &[&str]) -> String {
        format!(
            "CONSTRAINT {} UNIQUE ({})",
            self.quote(name),
            self.quote_list(columns)
        )
    }

    /// Index over `columns`.
    fn index(&self, name: &str, table: &str, columns: &[&str], exists: &str) -> Clause {
        Clause::Trailing(format!(
            "CREATE INDEX {exists}{} ON {} ({});",
            self.quote(name),
            self.quote(table),
            self.quote_list(columns)
        ))
    }

    /// Text placed between the closing parenthesis and the table comment.
    fn table_extra(&self, _table: &str) -> String {
        String::new()
    }

    /// Quote and comma-join identifiers.
    fn quote_list(&self, idents: &[&str]) -> String {
        idents
            .iter()
            .map(|ident| self.quote(ident))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
