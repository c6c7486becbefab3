//! DDL generation.
//!
//! Each model yields a [`TablePlan`]: its `CREATE TABLE` statement (plus index
//! and comment statements), the tables it references and the link tables of
//! the many-to-many relations it owns. Plans are then ordered so every table
//! is created after the tables it references.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use super::config::SchemaConfig;
use super::dialect::{Clause, ForeignKeyRef, SchemaDialect};
use super::naming;
use crate::catalog::{FieldDef, ModelMeta, ModelRegistry, OnDelete, RelationDef, RelationKind};
use crate::error::Error;

/// DDL for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlan {
    /// Table name.
    pub table: String,
    /// Model name.
    pub model: String,
    /// `CREATE TABLE` statement followed by index and comment statements.
    pub create_sql: String,
    /// Tables referenced by foreign keys.
    pub references: BTreeSet<String>,
    /// Link table statements for owned many-to-many relations.
    pub m2m_tables: Vec<String>,
}

/// Pieces of a table definition, collected per placement.
#[derive(Default)]
struct TableParts {
    entries: Vec<String>,
    inner_indexes: Vec<String>,
    inner_fks: Vec<String>,
    index_statements: Vec<String>,
    comment_statements: Vec<String>,
}

impl TableParts {
    /// Route a comment clause, returning its inline text.
    fn comment(&mut self, clause: Clause) -> String {
        match clause {
            Clause::Inline(text) => text,
            Clause::Inner(text) => {
                self.entries.push(text);
                String::new()
            }
            Clause::Trailing(text) => {
                self.comment_statements.push(text);
                String::new()
            }
        }
    }

    fn into_body(self) -> (Vec<String>, Vec<String>) {
        let mut body = self.entries;
        body.extend(self.inner_indexes);
        body.extend(self.inner_fks);
        let mut statements = self.index_statements;
        statements.extend(self.comment_statements);
        (body, statements)
    }
}

/// Generates DDL for every model in a registry.
pub struct SchemaGenerator<'a, D> {
    registry: &'a dyn ModelRegistry,
    dialect: D,
    config: SchemaConfig,
}

impl<'a, D: SchemaDialect> SchemaGenerator<'a, D> {
    /// Create a generator with the default configuration.
    pub fn new(registry: &'a dyn ModelRegistry, dialect: D) -> Self {
        Self {
            registry,
            dialect,
            config: SchemaConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    /// Dialect used for rendering.
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Active configuration.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Build the plan for one model.
    pub fn table_plan(&self, model: &dyn ModelMeta) -> Result<TablePlan, Error> {
        let table = model.table();
        let mut parts = TableParts::default();
        let mut references = BTreeSet::new();
        let mut indexed: Vec<&str> = Vec::new();

        for field in model.fields() {
            let column = field.column();
            let reference = foreign_key_of(model, field);

            let comment = match field.description.as_deref() {
                Some(text) => parts.comment(self.dialect.column_comment(table, column, text)),
                None => String::new(),
            };

            let backs_one_to_one = reference.is_some_and(|(_, _, one_to_one)| one_to_one);
            if field.pk && !backs_one_to_one {
                if let Some(definition) =
                    self.dialect
                        .primary_key_column(column, &field.field_type, &comment)
                {
                    parts.entries.push(definition);
                    continue;
                }
            }

            let mut definition = self.column_definition(field)?;
            match reference {
                Some((relation, on_delete, _)) => {
                    let target = self.registry.require(&relation.target)?;
                    let to_table = target.table();
                    let to_field = target.pk_column()?;
                    let constraint = naming::fk_name(table, column, to_table, to_field);
                    let clause = self.dialect.foreign_key(&ForeignKeyRef {
                        constraint: &constraint,
                        column,
                        table: to_table,
                        field: to_field,
                        on_delete: on_delete.as_sql(),
                        comment: &comment,
                    });
                    match clause {
                        Clause::Inline(text) => definition.push_str(&text),
                        Clause::Inner(text) => {
                            parts.inner_fks.push(text);
                            definition.push_str(&comment);
                        }
                        Clause::Trailing(text) => {
                            parts.index_statements.push(text);
                            definition.push_str(&comment);
                        }
                    }
                    references.insert(to_table.to_string());
                }
                None => definition.push_str(&comment),
            }
            parts.entries.push(definition);

            if field.index {
                indexed.push(column);
            }
        }

        for group in model.unique_together() {
            let columns = group_columns(model, group, "unique_together")?;
            let name = naming::index_name("uid", table, &columns);
            parts
                .entries
                .push(self.dialect.unique_constraint(&name, &columns));
        }

        let mut index_groups: Vec<Vec<&str>> = indexed.into_iter().map(|c| vec![c]).collect();
        for group in model.indexes() {
            index_groups.push(group_columns(model, group, "indexes")?);
        }
        for columns in index_groups {
            let name = naming::index_name("idx", table, &columns);
            match self
                .dialect
                .index(&name, table, &columns, self.config.exists_clause())
            {
                Clause::Trailing(text) => parts.index_statements.push(text),
                Clause::Inner(text) | Clause::Inline(text) => parts.inner_indexes.push(text),
            }
        }

        let table_comment = match model.description() {
            Some(text) => parts.comment(self.dialect.table_comment(table, text)),
            None => String::new(),
        };

        let (body, statements) = parts.into_body();
        let mut create_sql = self.create_table(table, &body, &table_comment);
        for statement in statements {
            create_sql.push('\n');
            create_sql.push_str(&statement);
        }

        let mut m2m_tables = Vec::new();
        for relation in model.relations() {
            if let Some(sql) = self.link_table(model, relation)? {
                m2m_tables.push(sql);
            }
        }

        Ok(TablePlan {
            table: table.to_string(),
            model: model.name().to_string(),
            create_sql,
            references,
            m2m_tables,
        })
    }

    /// Build plans for every model, in registry order.
    pub fn plans(&self) -> Result<Vec<TablePlan>, Error> {
        self.registry
            .models()
            .into_iter()
            .map(|model| self.table_plan(model))
            .collect()
    }

    /// Generate the whole schema in dependency order.
    ///
    /// Table statements come first in creation order, followed by link
    /// tables.
    #[instrument(skip_all, fields(dialect = self.dialect.name()))]
    pub fn create_schema_sql(&self) -> Result<String, Error> {
        let ordered = order_plans(self.plans()?)?;
        let table_count = ordered.len();

        let mut statements = Vec::with_capacity(table_count);
        let mut m2m_tables = Vec::new();
        for plan in ordered {
            statements.push(plan.create_sql);
            m2m_tables.extend(plan.m2m_tables);
        }
        let link_count = m2m_tables.len();
        statements.extend(m2m_tables);

        info!(tables = table_count, link_tables = link_count, "generated schema");
        Ok(statements.join("\n"))
    }

    fn column_definition(&self, field: &FieldDef) -> Result<String, Error> {
        let mut parts = vec![
            self.dialect.quote(field.column()),
            self.dialect.column_type(&field.field_type)?,
        ];
        if !field.null {
            parts.push("NOT NULL".to_string());
        }
        if field.unique {
            parts.push("UNIQUE".to_string());
        }
        if field.pk {
            parts.push("PRIMARY KEY".to_string());
        }
        Ok(parts.join(" "))
    }

    fn create_table(&self, table: &str, body: &[String], comment: &str) -> String {
        format!(
            "CREATE TABLE {}{} (\n    {}\n){}{};",
            self.config.exists_clause(),
            self.dialect.quote(table),
            body.join(",\n    "),
            self.dialect.table_extra(table),
            comment
        )
    }

    fn link_table(
        &self,
        model: &dyn ModelMeta,
        relation: &RelationDef,
    ) -> Result<Option<String>, Error> {
        let RelationKind::ManyToMany {
            through,
            forward_key,
            backward_key,
            owns_through: true,
            description,
            ..
        } = &relation.kind
        else {
            return Ok(None);
        };

        let target = self.registry.require(&relation.target)?;
        let mut parts = TableParts::default();
        let sides = [
            (backward_key.as_str(), model.pk()?, model.table()),
            (forward_key.as_str(), target.pk()?, target.table()),
        ];
        for (key, pk, to_table) in sides {
            let mut definition = format!(
                "{} {} NOT NULL",
                self.dialect.quote(key),
                self.dialect.column_type(&pk.field_type)?
            );
            let constraint = naming::fk_name(through, key, to_table, pk.column());
            match self.dialect.foreign_key(&ForeignKeyRef {
                constraint: &constraint,
                column: key,
                table: to_table,
                field: pk.column(),
                on_delete: OnDelete::Cascade.as_sql(),
                comment: "",
            }) {
                Clause::Inline(text) => definition.push_str(&text),
                Clause::Inner(text) => parts.inner_fks.push(text),
                Clause::Trailing(text) => parts.index_statements.push(text),
            }
            parts.entries.push(definition);
        }

        let comment = match description.as_deref() {
            Some(text) => parts.comment(self.dialect.table_comment(through, text)),
            None => String::new(),
        };

        let (body, statements) = parts.into_body();
        let mut sql = self.create_table(through, &body, &comment);
        for statement in statements {
            sql.push('\n');
            sql.push_str(&statement);
        }
        debug!(table = %through, owner = model.table(), "planned link table");
        Ok(Some(sql))
    }
}

/// The forward relation a column backs, with its delete policy and whether it
/// is one-to-one.
fn foreign_key_of<'m>(
    model: &'m dyn ModelMeta,
    field: &FieldDef,
) -> Option<(&'m RelationDef, OnDelete, bool)> {
    let relation = model.relation(field.reference.as_deref()?)?;
    match &relation.kind {
        RelationKind::ForeignKey {
            on_delete,
            one_to_one,
            ..
        } => Some((relation, *on_delete, *one_to_one)),
        _ => None,
    }
}

fn group_columns<'m>(
    model: &'m dyn ModelMeta,
    group: &[String],
    option: &str,
) -> Result<Vec<&'m str>, Error> {
    group
        .iter()
        .map(|name| {
            model.column_for(name).ok_or_else(|| {
                Error::Configuration(format!(
                    "unknown field {name} in {option} of {}",
                    model.name()
                ))
            })
        })
        .collect()
}

/// Order plans so referenced tables come first.
///
/// Repeatedly places the first pending plan whose references are all placed
/// (self-references allowed).
pub fn order_plans(plans: Vec<TablePlan>) -> Result<Vec<TablePlan>, Error> {
    let mut pending = plans;
    let mut created: BTreeSet<String> = BTreeSet::new();
    let mut ordered = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let idx = pending
            .iter()
            .position(|plan| {
                plan.references
                    .iter()
                    .all(|r| *r == plan.table || created.contains(r))
            })
            .ok_or_else(|| {
                Error::Configuration("Can't create schema due to cyclic fk references".into())
            })?;
        let plan = pending.remove(idx);
        debug!(table = %plan.table, position = ordered.len(), "placed table");
        created.insert(plan.table.clone());
        ordered.push(plan);
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, FieldType, ModelDef};
    use crate::schema::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};
    use pretty_assertions::assert_eq;

    fn plan(table: &str, refs: &[&str]) -> TablePlan {
        TablePlan {
            table: table.into(),
            model: table.into(),
            create_sql: format!("CREATE {table}"),
            references: refs.iter().map(|r| r.to_string()).collect(),
            m2m_tables: Vec::new(),
        }
    }

    fn author_catalog() -> Catalog {
        let author = ModelDef::new("Author")
            .with_description("Book writers")
            .with_field(FieldDef::primary_key("id", FieldType::int()))
            .with_field(FieldDef::new("name", FieldType::char(255)).with_description("Full name"));
        Catalog::new([author]).unwrap()
    }

    #[test]
    fn test_order_plans() {
        let ordered = order_plans(vec![
            plan("book", &["author", "book"]),
            plan("author", &[]),
        ])
        .unwrap();
        let tables: Vec<&str> = ordered.iter().map(|p| p.table.as_str()).collect();
        assert_eq!(tables, vec!["author", "book"]);
    }

    #[test]
    fn test_order_plans_cycle() {
        let err = order_plans(vec![plan("a", &["b"]), plan("b", &["a"])]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Can't create schema due to cyclic fk references"
        );
    }

    #[test]
    fn test_sqlite_inline_comments() {
        let catalog = author_catalog();
        let generator = SchemaGenerator::new(&catalog, SqliteDialect);
        let plan = generator.table_plan(catalog.require("Author").unwrap()).unwrap();
        assert_eq!(
            plan.create_sql,
            "CREATE TABLE IF NOT EXISTS \"author\" (\n    \
             \"id\" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,\n    \
             \"name\" VARCHAR(255) NOT NULL /* Full name */\n\
             ) /* Book writers */;"
        );
        assert!(plan.references.is_empty());
    }

    #[test]
    fn test_postgres_trailing_comments() {
        let catalog = author_catalog();
        let generator = SchemaGenerator::new(&catalog, PostgresDialect)
            .with_config(SchemaConfig::new().with_safe(false));
        let plan = generator.table_plan(catalog.require("Author").unwrap()).unwrap();
        assert_eq!(
            plan.create_sql,
            "CREATE TABLE \"author\" (\n    \
             \"id\" SERIAL NOT NULL PRIMARY KEY,\n    \
             \"name\" VARCHAR(255) NOT NULL\n\
             );\n\
             COMMENT ON COLUMN \"author\".\"name\" IS 'Full name';\n\
             COMMENT ON TABLE \"author\" IS 'Book writers';"
        );
    }

    #[test]
    fn test_mysql_inline_keys() {
        let author = ModelDef::new("Author")
            .with_field(FieldDef::primary_key("id", FieldType::int()))
            .with_field(FieldDef::new("name", FieldType::char(50)).with_index());
        let book = ModelDef::new("Book")
            .with_field(FieldDef::primary_key("id", FieldType::int()))
            .with_foreign_key("author", "Author");
        let catalog = Catalog::new([author, book]).unwrap();
        let generator = SchemaGenerator::new(&catalog, MySqlDialect::new());

        let author_plan = generator.table_plan(catalog.require("Author").unwrap()).unwrap();
        let idx = naming::index_name("idx", "author", &["name"]);
        assert_eq!(
            author_plan.create_sql,
            format!(
                "CREATE TABLE IF NOT EXISTS `author` (\n    \
                 `id` INT NOT NULL PRIMARY KEY AUTO_INCREMENT,\n    \
                 `name` VARCHAR(50) NOT NULL,\n    \
                 KEY `{idx}` (`name`)\n\
                 ) CHARACTER SET utf8mb4;"
            )
        );

        let book_plan = generator.table_plan(catalog.require("Book").unwrap()).unwrap();
        let fk = naming::fk_name("book", "author_id", "author", "id");
        assert_eq!(
            book_plan.create_sql,
            format!(
                "CREATE TABLE IF NOT EXISTS `book` (\n    \
                 `id` INT NOT NULL PRIMARY KEY AUTO_INCREMENT,\n    \
                 `author_id` INT NOT NULL,\n    \
                 CONSTRAINT `{fk}` FOREIGN KEY (`author_id`) REFERENCES `author` (`id`) ON DELETE CASCADE\n\
                 ) CHARACTER SET utf8mb4;"
            )
        );
    }

    #[test]
    fn test_unknown_group_field() {
        let model = ModelDef::new("Event")
            .with_field(FieldDef::primary_key("id", FieldType::int()))
            .with_unique_together(["missing"]);
        let catalog = Catalog::new([model]).unwrap();
        let generator = SchemaGenerator::new(&catalog, SqliteDialect);
        let err = generator
            .table_plan(catalog.require("Event").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("unknown field missing")));
    }
}
