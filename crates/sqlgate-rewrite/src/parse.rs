//! Candidate parsing and statement-shape validation.

use sqlgate_core::{ErrorCode, GatewayError};
use sqlparser::ast::{Query, Select, SetExpr, Statement};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Parse an already-guarded candidate into the single SELECT it must be.
///
/// Anything that is not exactly one plain `SELECT` is rejected: multiple
/// statements, non-query statements, set operations, `WITH` clauses and
/// `SELECT ... INTO` targets.
pub fn parse_select(sql: &str) -> Result<Box<Query>, GatewayError> {
    let mut statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| GatewayError::new(ErrorCode::ParseError, format!("failed to parse SQL: {e}")))?;

    if statements.is_empty() {
        return Err(GatewayError::new(
            ErrorCode::ParseError,
            "no SQL statement found",
        ));
    }
    if statements.len() > 1 {
        return Err(GatewayError::new(
            ErrorCode::MultiStatement,
            "multiple statements are not allowed",
        ));
    }

    let query = match statements.remove(0) {
        Statement::Query(query) => query,
        _ => {
            return Err(GatewayError::new(
                ErrorCode::NotSelect,
                "only SELECT statements are allowed",
            ))
        }
    };

    if query.with.is_some() {
        return Err(GatewayError::new(
            ErrorCode::CteNotSupported,
            "WITH clauses are not supported",
        ));
    }

    match query.body.as_ref() {
        SetExpr::Select(select) => {
            if select.into.is_some() {
                return Err(GatewayError::new(
                    ErrorCode::SelectInto,
                    "SELECT INTO is not allowed",
                ));
            }
        }
        _ => {
            return Err(GatewayError::new(
                ErrorCode::NotSelect,
                "only plain SELECT statements are allowed",
            ))
        }
    }

    Ok(query)
}

/// The SELECT body of a query validated by [`parse_select`].
pub(crate) fn select_mut(query: &mut Query) -> Result<&mut Select, GatewayError> {
    match query.body.as_mut() {
        SetExpr::Select(select) => Ok(select),
        _ => Err(GatewayError::new(
            ErrorCode::NotSelect,
            "only plain SELECT statements are allowed",
        )),
    }
}
