//! ORMKit Core - Model catalog, filter resolution and schema generation.
//!
//! This crate turns model metadata into the pieces an SQL builder needs:
//! filter trees resolve to [`QueryModifier`]s, relation paths resolve to
//! joins and prefetch trees, and the catalog renders as dependency-ordered
//! DDL.

pub mod catalog;
pub mod error;
pub mod query;
pub mod schema;

pub use catalog::{
    Catalog, FieldDef, FieldType, FilterInfo, ModelDef, ModelMeta, ModelRegistry, OnDelete,
    RelationDef, RelationKind,
};
pub use error::Error;
pub use query::{
    relation_joins, Annotation, Annotations, CustomFilters, FilterValue, Join, JoinType, Lookup,
    PrefetchTree, Predicate, Q, QueryModifier, ResolveContext,
};
pub use schema::{
    MySqlDialect, PostgresDialect, SchemaConfig, SchemaDialect, SchemaGenerator, SqliteDialect,
};

/// Re-export protocol types.
pub use ormkit_proto as proto;
