//! Model catalog for ORMKit.
//!
//! The catalog stores metadata about models, fields and relations, and exposes
//! it read-only through [`ModelMeta`] and [`ModelRegistry`].

mod catalog;
mod field;
mod filter;
mod meta;
mod model;
mod relation;
mod types;

pub use catalog::Catalog;
pub use field::FieldDef;
pub use filter::{FilterInfo, FilterJoin};
pub use meta::{ModelMeta, ModelRegistry};
pub use model::ModelDef;
pub use relation::{OnDelete, RelationDef, RelationKind};
pub use types::{names as type_names, DecimalSpec, FieldType};
