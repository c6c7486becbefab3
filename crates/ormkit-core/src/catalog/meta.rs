//! Read-only metadata capabilities.
//!
//! The query and schema layers never touch [`ModelDef`](super::ModelDef)
//! directly; they consume models through [`ModelMeta`] and look up related
//! models through [`ModelRegistry`].

use super::field::FieldDef;
use super::filter::{FilterInfo, FilterJoin};
use super::relation::{RelationDef, RelationKind};
use crate::error::Error;
use crate::query::Lookup;

/// Read-only view of one model's metadata.
pub trait ModelMeta {
    /// Model name.
    fn name(&self) -> &str;

    /// Table name.
    fn table(&self) -> &str;

    /// Table description.
    fn description(&self) -> Option<&str>;

    /// Data fields in declaration order.
    fn fields(&self) -> &[FieldDef];

    /// Relations in declaration order.
    fn relations(&self) -> &[RelationDef];

    /// Unique-together groups (field names).
    fn unique_together(&self) -> &[Vec<String>];

    /// Composite index groups (field names).
    fn indexes(&self) -> &[Vec<String>];

    /// Get a field by name.
    fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Get a relation by name.
    fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations().iter().find(|r| r.name == name)
    }

    /// The primary-key field.
    fn pk(&self) -> Result<&FieldDef, Error> {
        self.fields().iter().find(|f| f.pk).ok_or_else(|| {
            Error::Configuration(format!("model {} has no primary key", self.name()))
        })
    }

    /// Column name of the primary key.
    fn pk_column(&self) -> Result<&str, Error> {
        Ok(self.pk()?.column())
    }

    /// Names of every traversable relation.
    fn fetch_fields(&self) -> Vec<&str> {
        self.relations().iter().map(|r| r.name.as_str()).collect()
    }

    /// Resolve a field or relation name to its column on this model's table.
    ///
    /// Foreign-key relation names map to their backing column.
    fn column_for(&self, name: &str) -> Option<&str> {
        if let Some(field) = self.field(name) {
            return Some(field.column());
        }
        let source = self.relation(name)?.source_field()?;
        self.field(source).map(FieldDef::column)
    }

    /// Look up the filter registered under `key`.
    ///
    /// Data fields register `field` and `field__<op>`, compared on their own
    /// column. Many-to-many and reverse foreign-key relations register
    /// `relation` and `relation__<op>`, compared on the far side through a
    /// join. Related models are resolved through `registry`.
    fn filter(&self, registry: &dyn ModelRegistry, key: &str) -> Option<FilterInfo> {
        let (base, lookup) = match key.rsplit_once("__") {
            Some((base, suffix)) => match Lookup::from_suffix(suffix) {
                Some(lookup) => (base, lookup),
                None => (key, Lookup::Exact),
            },
            None => (key, Lookup::Exact),
        };

        if let Some(field) = self.field(base) {
            return Some(FilterInfo {
                field: base.to_string(),
                column: field.column().to_string(),
                lookup,
                join: None,
            });
        }

        let relation = self.relation(base)?;
        match &relation.kind {
            RelationKind::ForeignKey { .. } => None,
            RelationKind::ManyToMany {
                through,
                forward_key,
                backward_key,
                ..
            } => Some(FilterInfo {
                field: base.to_string(),
                column: forward_key.clone(),
                lookup,
                join: Some(FilterJoin {
                    table: through.clone(),
                    backward_key: backward_key.clone(),
                }),
            }),
            RelationKind::BackwardForeignKey { relation_field, .. } => {
                let target = registry.model(&relation.target)?;
                let backward_key = target.field(relation_field)?.column().to_string();
                Some(FilterInfo {
                    field: base.to_string(),
                    column: target.pk_column().ok()?.to_string(),
                    lookup,
                    join: Some(FilterJoin {
                        table: target.table().to_string(),
                        backward_key,
                    }),
                })
            }
        }
    }
}

/// Lookup of models by name.
pub trait ModelRegistry {
    /// Get a model by name.
    fn model(&self, name: &str) -> Option<&dyn ModelMeta>;

    /// All models in declaration order.
    fn models(&self) -> Vec<&dyn ModelMeta>;

    /// Get a model by name, failing if it is unknown.
    fn require(&self, name: &str) -> Result<&dyn ModelMeta, Error> {
        self.model(name)
            .ok_or_else(|| Error::Configuration(format!("unknown model {name}")))
    }
}
