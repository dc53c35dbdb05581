//! # sqlgate-runtime
//!
//! Composes the sqlgate-rewrite stages into one request-scoped pipeline and
//! defines the executor boundary. Validation is pure and deterministic; only
//! [`QueryPipeline::execute`] touches the database, through whatever
//! [`ReadOnlyExecutor`] the embedding service wires in.

pub mod executor;
pub mod pipeline;

pub use executor::{ReadOnlyExecutor, Row};
pub use pipeline::{slice_page, QueryPipeline, RewriteOutput};
