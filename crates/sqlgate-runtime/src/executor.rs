//! The executor boundary.

use async_trait::async_trait;
use sqlgate_core::GatewayError;

/// One result row: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Executes a rewritten, parameterized query under read-only guarantees.
///
/// Implementations must open a read-only transaction with a statement
/// timeout, release the connection on every exit path, and re-apply the
/// lexical guard to `sql` regardless of who produced it.
#[async_trait]
pub trait ReadOnlyExecutor: Send + Sync {
    async fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>, GatewayError>;
}
