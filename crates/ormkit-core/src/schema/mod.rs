//! Schema generation.
//!
//! [`SchemaGenerator`] renders `CREATE TABLE` DDL for every model of a
//! registry through a [`SchemaDialect`], ordering tables so foreign keys only
//! reference tables that already exist.

mod config;
pub mod dialect;
mod generator;
pub mod naming;

pub use config::{SchemaConfig, DEFAULT_SAFE};
pub use dialect::{Clause, ForeignKeyRef, MySqlDialect, PostgresDialect, SchemaDialect, SqliteDialect};
pub use generator::{order_plans, SchemaGenerator, TablePlan};
pub use naming::{fk_name, index_name, make_hash, MAX_IDENTIFIER_LEN};
