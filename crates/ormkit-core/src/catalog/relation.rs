//! Relation definitions between models.

use serde::{Deserialize, Serialize};

/// Behavior when a referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnDelete {
    /// Delete referencing rows.
    #[default]
    Cascade,
    /// Prevent deletion while referencing rows exist.
    Restrict,
    /// Set the referencing column to NULL.
    SetNull,
    /// Set the referencing column to its default.
    SetDefault,
    /// Defer the check to the end of the statement.
    NoAction,
}

impl OnDelete {
    /// SQL spelling of the policy.
    pub fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::Restrict => "RESTRICT",
            OnDelete::SetNull => "SET NULL",
            OnDelete::SetDefault => "SET DEFAULT",
            OnDelete::NoAction => "NO ACTION",
        }
    }
}

/// Shape of a relation.
///
/// Many-to-many key and table names left empty are filled in when the
/// catalog is linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationKind {
    /// Forward reference; the declaring model owns the FK column.
    ForeignKey {
        /// Name of the FK column field on the declaring model.
        #[serde(default)]
        source_field: String,
        /// Delete policy.
        #[serde(default)]
        on_delete: OnDelete,
        /// Whether the reference is one-to-one (unique column).
        #[serde(default)]
        one_to_one: bool,
        /// Whether the FK column accepts NULL.
        #[serde(default)]
        null: bool,
        /// Name of the reverse relation created on the target.
        #[serde(default)]
        related_name: Option<String>,
        /// Description, emitted as the FK column comment.
        #[serde(default)]
        description: Option<String>,
    },
    /// The target model holds a foreign key to the declaring model.
    BackwardForeignKey {
        /// Name of the FK column field on the target model.
        relation_field: String,
        /// Whether the reverse side is one-to-one.
        #[serde(default)]
        one_to_one: bool,
    },
    /// Association through a two-column link table.
    ManyToMany {
        /// Link table name.
        #[serde(default)]
        through: String,
        /// Link column referencing the target model.
        #[serde(default)]
        forward_key: String,
        /// Link column referencing the declaring model.
        #[serde(default)]
        backward_key: String,
        /// Whether this side creates the link table.
        #[serde(default = "default_owns_through")]
        owns_through: bool,
        /// Name of the reverse relation created on the target.
        #[serde(default)]
        related_name: Option<String>,
        /// Description, emitted as the link table comment.
        #[serde(default)]
        description: Option<String>,
    },
}

fn default_owns_through() -> bool {
    true
}

/// A named relation from the declaring model to a target model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name (unique within the declaring model).
    pub name: String,
    /// Target model name.
    pub target: String,
    /// Relation shape.
    pub kind: RelationKind,
}

impl RelationDef {
    /// Create a foreign-key relation backed by the `{name}_id` column.
    pub fn foreign_key(name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: RelationKind::ForeignKey {
                source_field: format!("{name}_id"),
                on_delete: OnDelete::Cascade,
                one_to_one: false,
                null: false,
                related_name: None,
                description: None,
            },
            name,
            target: target.into(),
        }
    }

    /// Create a one-to-one relation backed by a unique `{name}_id` column.
    pub fn one_to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        let mut relation = Self::foreign_key(name, target);
        if let RelationKind::ForeignKey { one_to_one, .. } = &mut relation.kind {
            *one_to_one = true;
        }
        relation
    }

    /// Create a many-to-many relation with default link table naming.
    pub fn many_to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::ManyToMany {
                through: String::new(),
                forward_key: String::new(),
                backward_key: String::new(),
                owns_through: true,
                related_name: None,
                description: None,
            },
        }
    }

    /// Create a reverse foreign-key relation.
    pub fn backward(
        name: impl Into<String>,
        target: impl Into<String>,
        relation_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::BackwardForeignKey {
                relation_field: relation_field.into(),
                one_to_one: false,
            },
        }
    }

    /// Set the delete policy of a foreign key.
    pub fn with_on_delete(mut self, policy: OnDelete) -> Self {
        if let RelationKind::ForeignKey { on_delete, .. } = &mut self.kind {
            *on_delete = policy;
        }
        self
    }

    /// Allow NULL in the FK column.
    pub fn nullable(mut self) -> Self {
        if let RelationKind::ForeignKey { null, .. } = &mut self.kind {
            *null = true;
        }
        self
    }

    /// Set the FK column field name.
    pub fn with_source_field(mut self, field: impl Into<String>) -> Self {
        if let RelationKind::ForeignKey { source_field, .. } = &mut self.kind {
            *source_field = field.into();
        }
        self
    }

    /// Set the link table name of a many-to-many relation.
    pub fn with_through(mut self, table: impl Into<String>) -> Self {
        if let RelationKind::ManyToMany { through, .. } = &mut self.kind {
            *through = table.into();
        }
        self
    }

    /// Set the link columns of a many-to-many relation.
    pub fn with_keys(mut self, backward: impl Into<String>, forward: impl Into<String>) -> Self {
        if let RelationKind::ManyToMany {
            backward_key,
            forward_key,
            ..
        } = &mut self.kind
        {
            *backward_key = backward.into();
            *forward_key = forward.into();
        }
        self
    }

    /// Name the reverse relation created on the target.
    pub fn with_related_name(mut self, name: impl Into<String>) -> Self {
        match &mut self.kind {
            RelationKind::ForeignKey { related_name, .. }
            | RelationKind::ManyToMany { related_name, .. } => *related_name = Some(name.into()),
            RelationKind::BackwardForeignKey { .. } => {}
        }
        self
    }

    /// Set the description.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        match &mut self.kind {
            RelationKind::ForeignKey { description, .. }
            | RelationKind::ManyToMany { description, .. } => *description = Some(text.into()),
            RelationKind::BackwardForeignKey { .. } => {}
        }
        self
    }

    /// Check if this is a forward foreign key (including one-to-one).
    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, RelationKind::ForeignKey { .. })
    }

    /// Check if this is a many-to-many relation.
    pub fn is_many_to_many(&self) -> bool {
        matches!(self.kind, RelationKind::ManyToMany { .. })
    }

    /// FK column field name for forward foreign keys.
    pub fn source_field(&self) -> Option<&str> {
        match &self.kind {
            RelationKind::ForeignKey { source_field, .. } => Some(source_field),
            _ => None,
        }
    }

    /// Description of the relation, if any.
    pub fn description(&self) -> Option<&str> {
        match &self.kind {
            RelationKind::ForeignKey { description, .. }
            | RelationKind::ManyToMany { description, .. } => description.as_deref(),
            RelationKind::BackwardForeignKey { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_builder() {
        let rel = RelationDef::foreign_key("author", "Author")
            .with_on_delete(OnDelete::SetNull)
            .nullable()
            .with_related_name("books");

        assert!(rel.is_foreign_key());
        assert_eq!(rel.source_field(), Some("author_id"));
        match rel.kind {
            RelationKind::ForeignKey {
                on_delete,
                null,
                related_name,
                one_to_one,
                ..
            } => {
                assert_eq!(on_delete, OnDelete::SetNull);
                assert!(null);
                assert!(!one_to_one);
                assert_eq!(related_name.as_deref(), Some("books"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_many_to_many_builder() {
        let rel = RelationDef::many_to_many("tags", "Tag")
            .with_through("book_tag")
            .with_keys("book_id", "tag_id");

        assert!(rel.is_many_to_many());
        assert_eq!(rel.source_field(), None);
        match rel.kind {
            RelationKind::ManyToMany {
                through,
                forward_key,
                backward_key,
                owns_through,
                ..
            } => {
                assert_eq!(through, "book_tag");
                assert_eq!(backward_key, "book_id");
                assert_eq!(forward_key, "tag_id");
                assert!(owns_through);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_on_delete_sql() {
        assert_eq!(OnDelete::default().as_sql(), "CASCADE");
        assert_eq!(OnDelete::SetNull.as_sql(), "SET NULL");
    }

    #[test]
    fn test_relation_from_json() {
        let rel: RelationDef = serde_json::from_str(
            r#"{"name": "tags", "target": "Tag", "kind": {"type": "many_to_many"}}"#,
        )
        .unwrap();
        assert_eq!(rel, RelationDef::many_to_many("tags", "Tag"));
    }
}
