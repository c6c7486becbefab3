//! Resolution of filter trees into query modifiers.

use std::collections::BTreeSet;

use ormkit_proto::{Term, Value};
use tracing::trace;

use super::annotation::{Annotations, CustomFilters};
use super::filter::{FilterValue, JoinType, Q};
use super::join::relation_joins;
use super::lookup::Lookup;
use super::modifier::{Join, QueryModifier};
use crate::catalog::{ModelMeta, ModelRegistry, RelationKind};
use crate::error::Error;

static NO_ANNOTATIONS: Annotations = Annotations::new();
static NO_CUSTOM_FILTERS: CustomFilters = CustomFilters::new();

/// Registries borrowed for one resolution call.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Model lookup for relation traversal.
    pub registry: &'a dyn ModelRegistry,
    /// Named annotations addressable by custom filters.
    pub annotations: &'a Annotations,
    /// Filter keys that compare annotations.
    pub custom_filters: &'a CustomFilters,
}

impl<'a> ResolveContext<'a> {
    /// Context without annotations.
    pub fn new(registry: &'a dyn ModelRegistry) -> Self {
        Self {
            registry,
            annotations: &NO_ANNOTATIONS,
            custom_filters: &NO_CUSTOM_FILTERS,
        }
    }

    /// Attach annotations.
    pub fn with_annotations(mut self, annotations: &'a Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Attach custom filters.
    pub fn with_custom_filters(mut self, custom_filters: &'a CustomFilters) -> Self {
        self.custom_filters = custom_filters;
        self
    }
}

impl Q {
    /// Resolve the tree against `model`.
    ///
    /// A node with keyword constraints resolves those only; otherwise its
    /// children are resolved and folded with the node's join type. Negation
    /// applies last.
    pub fn resolve(
        &self,
        model: &dyn ModelMeta,
        ctx: &ResolveContext<'_>,
    ) -> Result<QueryModifier, Error> {
        let modifier = if !self.filters.is_empty() {
            self.resolve_filters(model, ctx)?
        } else {
            self.resolve_children(model, ctx)?
        };
        Ok(if self.negated {
            modifier.negate()
        } else {
            modifier
        })
    }

    fn resolve_children(
        &self,
        model: &dyn ModelMeta,
        ctx: &ResolveContext<'_>,
    ) -> Result<QueryModifier, Error> {
        let mut modifier = QueryModifier::new();
        for child in &self.children {
            modifier = combine(modifier, child.resolve(model, ctx)?, self.join_type);
        }
        Ok(modifier)
    }

    fn resolve_filters(
        &self,
        model: &dyn ModelMeta,
        ctx: &ResolveContext<'_>,
    ) -> Result<QueryModifier, Error> {
        let mut modifier = QueryModifier::new();
        for (raw_key, raw_value) in &self.filters {
            let (key, value) = classify_key(model, ctx, raw_key, raw_value)?;
            trace!(model = model.name(), key = %key, "resolving filter");
            let part = if ctx.custom_filters.contains(&key) {
                resolve_custom_filter(model, ctx, &key, value)?
            } else {
                resolve_regular_filter(model, ctx, &key, value)?
            };
            modifier = combine(modifier, part, self.join_type);
        }
        Ok(modifier)
    }
}

fn combine(acc: QueryModifier, part: QueryModifier, join_type: JoinType) -> QueryModifier {
    match join_type {
        JoinType::And => acc.and(part),
        JoinType::Or => acc.or(part),
    }
}

/// Map a raw key to the key the filter registry understands.
///
/// Forward references are rewritten to their backing column field; instance
/// values are replaced by their primary key.
fn classify_key(
    model: &dyn ModelMeta,
    ctx: &ResolveContext<'_>,
    key: &str,
    value: &FilterValue,
) -> Result<(String, Value), Error> {
    let identity = value.identity().clone();

    if let Some(relation) = model.relation(key) {
        match &relation.kind {
            RelationKind::ForeignKey { source_field, .. } => {
                return Ok((source_field.clone(), identity));
            }
            RelationKind::ManyToMany { .. } | RelationKind::BackwardForeignKey { .. } => {
                return Ok((key.to_string(), identity));
            }
        }
    }

    let head = key.split("__").next().unwrap_or(key);
    if model.relation(head).is_some()
        || ctx.custom_filters.contains(key)
        || model.filter(ctx.registry, key).is_some()
    {
        return Ok((key.to_string(), identity));
    }

    Err(unknown_key(model, ctx, key))
}

/// `Error::Field` listing the sorted field, relation and custom filter names.
fn unknown_key(model: &dyn ModelMeta, ctx: &ResolveContext<'_>, key: &str) -> Error {
    let allowed: BTreeSet<String> = model
        .fields()
        .iter()
        .map(|f| f.name.clone())
        .chain(model.relations().iter().map(|r| r.name.clone()))
        .chain(ctx.custom_filters.keys().map(str::to_string))
        .collect();
    Error::Field {
        key: key.to_string(),
        allowed: allowed.into_iter().collect(),
    }
}

fn resolve_regular_filter(
    model: &dyn ModelMeta,
    ctx: &ResolveContext<'_>,
    key: &str,
    value: Value,
) -> Result<QueryModifier, Error> {
    if model.filter(ctx.registry, key).is_none() {
        if let Some((head, rest)) = key.split_once("__") {
            if model.relation(head).is_some() {
                return resolve_nested_filter(model, ctx, head, rest, value);
            }
        }
    }

    let (info, value) = match model.filter(ctx.registry, &Lookup::IsNull.key(key)) {
        Some(info) if value.is_null() => (info, Value::Bool(true)),
        _ => {
            let info = model
                .filter(ctx.registry, key)
                .ok_or_else(|| unknown_key(model, ctx, key))?;
            (info, value)
        }
    };

    let mut modifier = QueryModifier::new();
    if let Some(join) = &info.join {
        modifier.joins.push(Join::new(
            join.table.as_str(),
            Term::column(join.table.as_str(), join.backward_key.as_str())
                .eq_term(Term::column(model.table(), model.pk_column()?)),
        ));
    }
    let term = Term::column(info.table(model.table()), info.column.as_str());
    Ok(modifier.with_predicate(info.lookup.apply(term, &value)?))
}

fn resolve_nested_filter(
    model: &dyn ModelMeta,
    ctx: &ResolveContext<'_>,
    head: &str,
    rest: &str,
    value: Value,
) -> Result<QueryModifier, Error> {
    let relation = model.relation(head).ok_or_else(|| {
        Error::Operational(format!("relation {head} for {} not found", model.table()))
    })?;
    let target = ctx.registry.require(&relation.target)?;
    let joins = relation_joins(ctx.registry, model, relation)?;
    let nested = Q::filter(rest, value).resolve(target, ctx)?;
    Ok(QueryModifier::from_joins(joins).and(nested))
}

fn resolve_custom_filter(
    model: &dyn ModelMeta,
    ctx: &ResolveContext<'_>,
    key: &str,
    value: Value,
) -> Result<QueryModifier, Error> {
    let filter = ctx
        .custom_filters
        .get(key)
        .ok_or_else(|| Error::Operational(format!("custom filter {key} not registered")))?;
    let annotation = ctx.annotations.get(filter.annotation).ok_or_else(|| {
        Error::Operational(format!("annotation {} not found", filter.annotation))
    })?;

    let resolved = annotation.resolve(ctx.registry, model)?;
    let criterion = filter.lookup.apply(resolved.term.clone(), &value)?;
    let modifier = QueryModifier::from_joins(resolved.joins);
    Ok(if resolved.term.is_aggregate() {
        modifier.with_having(criterion)
    } else {
        modifier.with_predicate(criterion)
    })
}
