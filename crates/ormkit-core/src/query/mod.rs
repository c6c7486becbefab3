//! Query layer for ORMKit.
//!
//! This module turns [`Q`] filter trees into [`QueryModifier`]s: a `WHERE`
//! predicate, the joins it needs and a `HAVING` predicate. It also builds
//! prefetch request trees from dotted relation paths.

mod annotation;
mod filter;
mod join;
mod lookup;
mod modifier;
mod prefetch;
mod resolve;

pub use annotation::{Annotation, Annotations, CustomFilter, CustomFilters, ResolvedAnnotation};
pub use filter::{FilterValue, JoinType, Q};
pub use join::relation_joins;
pub use lookup::{escape_like, Lookup};
pub use modifier::{Join, Predicate, QueryModifier};
pub use prefetch::{LoadSpec, PrefetchEntry, PrefetchTree};
pub use resolve::ResolveContext;
