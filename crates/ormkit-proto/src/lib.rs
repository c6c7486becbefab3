//! ORMKit predicate IR.
//!
//! This crate defines the values and boolean expressions that the query core
//! produces and the SQL assembly stage consumes.
//!
//! # Modules
//!
//! - [`value`] - Literal values used as filter operands
//! - [`criterion`] - Columns, terms and boolean criteria
//! - [`error`] - Conversion error types
//!
//! # Rendering
//!
//! Every IR type implements [`std::fmt::Display`], producing SQL text with
//! inline literals:
//!
//! ```
//! use ormkit_proto::{CompareOp, Term};
//!
//! let c = Term::column("author", "name")
//!     .eq("x")
//!     .and(Term::column("author", "age").compare(CompareOp::Ge, 18i64));
//! assert_eq!(
//!     c.to_string(),
//!     r#""author"."name" = 'x' AND "author"."age" >= 18"#
//! );
//! ```

pub mod criterion;
pub mod error;
pub mod value;

pub use criterion::{AggregateFunction, Column, CompareOp, Criterion, Term};
pub use error::Error;
pub use value::Value;
