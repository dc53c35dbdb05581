//! # sqlgate-schema
//!
//! The in-memory schema model the pipeline validates against: immutable
//! [`SchemaSnapshot`] values built by the Postgres introspector, indexed for
//! case-folded lookup, and published through a [`SchemaRegistry`].

pub mod model;
pub mod registry;

pub use model::{SchemaSnapshot, SchemaTable, SqlDialect};
pub use registry::SchemaRegistry;
