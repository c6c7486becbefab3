//! Relation traversal to join steps.
//!
//! - Forward FK: `target.pk = origin.source_field`
//! - Backward FK: `target.relation_field = origin.pk`
//! - Many-to-many: `through.backward_key = origin.pk`, then
//!   `target.pk = through.forward_key`

use ormkit_proto::Term;
use tracing::debug;

use super::modifier::Join;
use crate::catalog::{ModelMeta, ModelRegistry, RelationDef, RelationKind};
use crate::error::Error;

/// Joins reaching `relation`'s target from `origin`.
pub fn relation_joins(
    registry: &dyn ModelRegistry,
    origin: &dyn ModelMeta,
    relation: &RelationDef,
) -> Result<Vec<Join>, Error> {
    let target = registry.require(&relation.target)?;
    let target_table = target.table();

    let joins = match &relation.kind {
        RelationKind::ForeignKey { source_field, .. } => {
            let column = column_of(origin, source_field)?;
            vec![Join::new(
                target_table,
                Term::column(target_table, target.pk_column()?)
                    .eq_term(Term::column(origin.table(), column)),
            )]
        }
        RelationKind::BackwardForeignKey { relation_field, .. } => {
            let column = column_of(target, relation_field)?;
            vec![Join::new(
                target_table,
                Term::column(target_table, column)
                    .eq_term(Term::column(origin.table(), origin.pk_column()?)),
            )]
        }
        RelationKind::ManyToMany {
            through,
            forward_key,
            backward_key,
            ..
        } => vec![
            Join::new(
                through.as_str(),
                Term::column(through.as_str(), backward_key.as_str())
                    .eq_term(Term::column(origin.table(), origin.pk_column()?)),
            ),
            Join::new(
                target_table,
                Term::column(target_table, target.pk_column()?)
                    .eq_term(Term::column(through.as_str(), forward_key.as_str())),
            ),
        ],
    };

    debug!(
        origin = origin.table(),
        relation = %relation.name,
        steps = joins.len(),
        "resolved relation joins"
    );
    Ok(joins)
}

fn column_of<'m>(model: &'m dyn ModelMeta, field: &str) -> Result<&'m str, Error> {
    model.field(field).map(|f| f.column()).ok_or_else(|| {
        Error::Configuration(format!(
            "field {field} not found on model {}",
            model.name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, FieldDef, FieldType, ModelDef};

    fn catalog() -> Catalog {
        let author = ModelDef::new("Author")
            .with_field(FieldDef::primary_key("id", FieldType::int()))
            .with_field(FieldDef::new("name", FieldType::char(100)));
        let tag = ModelDef::new("Tag").with_field(FieldDef::primary_key("id", FieldType::int()));
        let book = ModelDef::new("Book")
            .with_field(FieldDef::primary_key("id", FieldType::int()))
            .with_relation(RelationDef::foreign_key("author", "Author").with_related_name("books"))
            .with_relation(RelationDef::many_to_many("tags", "Tag").with_related_name("books"));
        Catalog::new([author, tag, book]).unwrap()
    }

    fn joins_for(model: &str, relation: &str) -> Vec<String> {
        let catalog = catalog();
        let origin = catalog.require(model).unwrap();
        let relation = origin.relation(relation).unwrap();
        relation_joins(&catalog, origin, relation)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_forward_join() {
        assert_eq!(
            joins_for("Book", "author"),
            vec![r#"LEFT OUTER JOIN "author" ON "author"."id" = "book"."author_id""#]
        );
    }

    #[test]
    fn test_backward_join() {
        assert_eq!(
            joins_for("Author", "books"),
            vec![r#"LEFT OUTER JOIN "book" ON "book"."author_id" = "author"."id""#]
        );
    }

    #[test]
    fn test_many_to_many_joins() {
        assert_eq!(
            joins_for("Book", "tags"),
            vec![
                r#"LEFT OUTER JOIN "book_tag" ON "book_tag"."book_id" = "book"."id""#,
                r#"LEFT OUTER JOIN "tag" ON "tag"."id" = "book_tag"."tag_id""#,
            ]
        );
        assert_eq!(
            joins_for("Tag", "books"),
            vec![
                r#"LEFT OUTER JOIN "book_tag" ON "book_tag"."tag_id" = "tag"."id""#,
                r#"LEFT OUTER JOIN "book" ON "book"."id" = "book_tag"."book_id""#,
            ]
        );
    }
}
