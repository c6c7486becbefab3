//! Annotations and the custom filters that compare them.

use std::collections::BTreeMap;

use ormkit_proto::{AggregateFunction, Term};

use super::join::relation_joins;
use super::lookup::Lookup;
use super::modifier::Join;
use crate::catalog::{ModelMeta, ModelRegistry};
use crate::error::Error;

/// A computed expression attached to a query under a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// A plain column of the model.
    Column(String),
    /// An aggregate over a field or relation of the model.
    Aggregate {
        /// Aggregate function.
        function: AggregateFunction,
        /// Field name, relation name, or `*`.
        field: String,
        /// Whether `DISTINCT` applies.
        distinct: bool,
    },
}

/// Annotation set, keyed by name.
pub type Annotations = BTreeMap<String, Annotation>;

/// An annotation resolved against a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnnotation {
    /// The expression.
    pub term: Term,
    /// Joins the expression needs.
    pub joins: Vec<Join>,
}

impl Annotation {
    fn aggregate(function: AggregateFunction, field: impl Into<String>) -> Self {
        Annotation::Aggregate {
            function,
            field: field.into(),
            distinct: false,
        }
    }

    /// A plain column of the model.
    pub fn column(field: impl Into<String>) -> Self {
        Annotation::Column(field.into())
    }

    /// `COUNT` over a field, a relation (its target key) or `*`.
    pub fn count(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Count, field)
    }

    /// `SUM` over a field or relation.
    pub fn sum(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Sum, field)
    }

    /// `AVG` over a field or relation.
    pub fn avg(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Avg, field)
    }

    /// `MIN` over a field or relation.
    pub fn min(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Min, field)
    }

    /// `MAX` over a field or relation.
    pub fn max(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Max, field)
    }

    /// Apply `DISTINCT` to an aggregate.
    pub fn distinct(mut self) -> Self {
        if let Annotation::Aggregate { distinct, .. } = &mut self {
            *distinct = true;
        }
        self
    }

    /// Check whether this annotation groups rows.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Annotation::Aggregate { .. })
    }

    /// Resolve to a term on `model`'s table.
    ///
    /// Aggregates over a relation count the related primary key and carry the
    /// joins reaching it.
    pub fn resolve(
        &self,
        registry: &dyn ModelRegistry,
        model: &dyn ModelMeta,
    ) -> Result<ResolvedAnnotation, Error> {
        match self {
            Annotation::Column(field) => Ok(ResolvedAnnotation {
                term: field_term(model, field)?,
                joins: Vec::new(),
            }),
            Annotation::Aggregate {
                function,
                field,
                distinct,
            } => {
                if field == "*" {
                    return Ok(ResolvedAnnotation {
                        term: Term::aggregate(*function, None, *distinct),
                        joins: Vec::new(),
                    });
                }
                if model.field(field).is_none() {
                    if let Some(relation) = model.relation(field) {
                        let target = registry.require(&relation.target)?;
                        let joins = relation_joins(registry, model, relation)?;
                        let term = Term::column(target.table(), target.pk_column()?);
                        return Ok(ResolvedAnnotation {
                            term: Term::aggregate(*function, Some(term), *distinct),
                            joins,
                        });
                    }
                }
                Ok(ResolvedAnnotation {
                    term: Term::aggregate(*function, Some(field_term(model, field)?), *distinct),
                    joins: Vec::new(),
                })
            }
        }
    }
}

fn field_term(model: &dyn ModelMeta, field: &str) -> Result<Term, Error> {
    let column = model.column_for(field).ok_or_else(|| {
        Error::Operational(format!(
            "annotation field {field} for {} not found",
            model.table()
        ))
    })?;
    Ok(Term::column(model.table(), column))
}

/// A filter key that compares an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomFilter<'a> {
    /// Annotation name.
    pub annotation: &'a str,
    /// Comparison operator.
    pub lookup: Lookup,
}

/// Registry of filter keys addressing annotations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomFilters {
    filters: BTreeMap<String, (String, Lookup)>,
}

impl CustomFilters {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            filters: BTreeMap::new(),
        }
    }

    /// Registry with `name` and `name__<op>` for every operator.
    pub fn for_annotation(name: &str) -> Self {
        Self::new().with_annotation(name)
    }

    /// Register `name` and `name__<op>` for every operator.
    pub fn with_annotation(mut self, name: &str) -> Self {
        for lookup in Lookup::ALL {
            self.filters
                .insert(lookup.key(name), (name.to_string(), lookup));
        }
        self
    }

    /// Look up a filter key.
    pub fn get(&self, key: &str) -> Option<CustomFilter<'_>> {
        self.filters.get(key).map(|(annotation, lookup)| CustomFilter {
            annotation,
            lookup: *lookup,
        })
    }

    /// Check whether a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.filters.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no key is registered.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
