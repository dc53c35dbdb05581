//! The pipeline orchestrator.
//!
//! Composes guard, parse, resolve, inject, paginate and serialize into one
//! call. Pure up to [`QueryPipeline::execute`]: the same inputs always yield
//! the same rewritten SQL and parameter list, so the whole validation path is
//! testable without a database.

use serde::Serialize;
use sqlgate_core::{ErrorCode, GatewayConfig, GatewayError};
use sqlgate_rewrite::{
    apply_pagination, inject_tenant_filters, parse_select, serialize, LexicalGuard, Resolver,
    SensitiveColumns,
};
use sqlgate_schema::SchemaSnapshot;

use crate::executor::{ReadOnlyExecutor, Row};

/// The product of a successful rewrite.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteOutput {
    /// Rewritten SQL: a single parameterized SELECT, no trailing semicolon.
    pub sql: String,
    /// Positional parameters; one tenant-id entry when any tenant-bearing
    /// table was referenced, empty otherwise.
    pub params: Vec<String>,
    /// Rows the caller will be shown.
    pub display_limit: u32,
    /// Rows requested from the database (`display_limit + 1`).
    pub fetch_limit: u32,
    /// Fully-qualified referenced tables, for audit.
    pub tables: Vec<String>,
}

/// Validates and rewrites model candidates, then hands them to an executor.
pub struct QueryPipeline {
    guard: LexicalGuard,
    sensitive: SensitiveColumns,
    hard_cap: u32,
}

impl QueryPipeline {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            guard: LexicalGuard::new(),
            sensitive: SensitiveColumns::new(),
            hard_cap: config.max_rows,
        }
    }

    /// Run the full static pipeline over one candidate.
    ///
    /// No stage feeds back into an earlier one; the first violation wins.
    pub fn validate_and_rewrite(
        &self,
        candidate: &str,
        snapshot: &SchemaSnapshot,
        tenant_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<RewriteOutput, GatewayError> {
        if tenant_id.trim().is_empty() {
            return Err(GatewayError::new(
                ErrorCode::TenantRequired,
                "a tenant identifier is required",
            ));
        }

        self.guard.check(candidate)?;
        let mut query = parse_select(candidate)?;

        let resolver = Resolver::new(snapshot, &self.sensitive);
        let resolution = resolver.resolve(&mut query)?;

        let params = inject_tenant_filters(&mut query, &resolution.tenant_targets, tenant_id)?;
        let limits = apply_pagination(&mut query, page, page_size, self.hard_cap)?;
        let sql = serialize(&query, &self.guard)?;

        tracing::debug!(
            tables = ?resolution.tables,
            display_limit = limits.display_limit,
            fetch_limit = limits.fetch_limit,
            parameterized = !params.is_empty(),
            "Rewrote candidate query"
        );

        Ok(RewriteOutput {
            sql,
            params,
            display_limit: limits.display_limit,
            fetch_limit: limits.fetch_limit,
            tables: resolution.tables,
        })
    }

    /// Execute a rewrite result. The only stage with observable effects.
    pub async fn execute(
        &self,
        executor: &dyn ReadOnlyExecutor,
        output: &RewriteOutput,
    ) -> Result<Vec<Row>, GatewayError> {
        executor.execute(&output.sql, &output.params).await
    }
}

/// Slice fetched rows down to the display limit.
///
/// The one-row overshoot requested by the pagination stage is the signal that
/// more rows exist; it is dropped here and reported as `has_more`.
pub fn slice_page(mut rows: Vec<Row>, display_limit: u32) -> (Vec<Row>, bool) {
    let has_more = rows.len() > display_limit as usize;
    rows.truncate(display_limit as usize);
    (rows, has_more)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: u64) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), serde_json::json!(n));
        row
    }

    #[test]
    fn slice_page_reports_truncation() {
        let rows = vec![row(1), row(2), row(3)];
        let (page, has_more) = slice_page(rows, 2);
        assert_eq!(page.len(), 2);
        assert!(has_more);

        let rows = vec![row(1), row(2)];
        let (page, has_more) = slice_page(rows, 2);
        assert_eq!(page.len(), 2);
        assert!(!has_more);
    }
}
