//! # sqlgate-adapter-pg
//!
//! PostgreSQL adapter for sqlgate: schema introspection into
//! [`sqlgate_schema::SchemaSnapshot`] values and the read-only executor that
//! runs rewritten queries under `SET TRANSACTION READ ONLY` with a statement
//! timeout.

pub mod executor;
pub mod introspect;

pub use executor::PgReadOnlyExecutor;
pub use introspect::introspect_snapshot;
