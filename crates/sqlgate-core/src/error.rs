//! The structured error surfaced by every pipeline stage.

use serde::Serialize;
use thiserror::Error;

/// Machine-readable rejection code, grouped by pipeline stage.
///
/// Serializes to SCREAMING_SNAKE_CASE so the outer layer (query router,
/// clarify loop) can route on it without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Lexical guard
    Semicolon,
    Comment,
    DisallowedKeyword,
    RowLock,
    SideEffectFn,
    InternalRewriteLeak,
    // Parse
    ParseError,
    MultiStatement,
    NotSelect,
    CteNotSupported,
    SelectInto,
    // Resolution
    FromUnsupported,
    SubqueryNotSupported,
    TableMissing,
    TableUnknown,
    JoinUnsupported,
    AliasUnknown,
    ColumnUnsupported,
    Wildcard,
    ParameterNotAllowed,
    SensitiveColumn,
    ColumnUnknown,
    ColumnAmbiguous,
    ColumnNoSource,
    // Pagination
    OffsetNotAllowed,
    LimitNotNumeric,
    LimitInvalid,
    // Request inputs
    TenantRequired,
    // Execution
    DbSchemaError,
    DbOther,
}

impl ErrorCode {
    /// The wire spelling of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Semicolon => "SEMICOLON",
            ErrorCode::Comment => "COMMENT",
            ErrorCode::DisallowedKeyword => "DISALLOWED_KEYWORD",
            ErrorCode::RowLock => "ROW_LOCK",
            ErrorCode::SideEffectFn => "SIDE_EFFECT_FN",
            ErrorCode::InternalRewriteLeak => "INTERNAL_REWRITE_LEAK",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::MultiStatement => "MULTI_STATEMENT",
            ErrorCode::NotSelect => "NOT_SELECT",
            ErrorCode::CteNotSupported => "CTE_NOT_SUPPORTED",
            ErrorCode::SelectInto => "SELECT_INTO",
            ErrorCode::FromUnsupported => "FROM_UNSUPPORTED",
            ErrorCode::SubqueryNotSupported => "SUBQUERY_NOT_SUPPORTED",
            ErrorCode::TableMissing => "TABLE_MISSING",
            ErrorCode::TableUnknown => "TABLE_UNKNOWN",
            ErrorCode::JoinUnsupported => "JOIN_UNSUPPORTED",
            ErrorCode::AliasUnknown => "ALIAS_UNKNOWN",
            ErrorCode::ColumnUnsupported => "COLUMN_UNSUPPORTED",
            ErrorCode::Wildcard => "WILDCARD",
            ErrorCode::ParameterNotAllowed => "PARAMETER_NOT_ALLOWED",
            ErrorCode::SensitiveColumn => "SENSITIVE_COLUMN",
            ErrorCode::ColumnUnknown => "COLUMN_UNKNOWN",
            ErrorCode::ColumnAmbiguous => "COLUMN_AMBIGUOUS",
            ErrorCode::ColumnNoSource => "COLUMN_NO_SOURCE",
            ErrorCode::OffsetNotAllowed => "OFFSET_NOT_ALLOWED",
            ErrorCode::LimitNotNumeric => "LIMIT_NOT_NUMERIC",
            ErrorCode::LimitInvalid => "LIMIT_INVALID",
            ErrorCode::TenantRequired => "TENANT_REQUIRED",
            ErrorCode::DbSchemaError => "DB_SCHEMA_ERROR",
            ErrorCode::DbOther => "DB_OTHER",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline rejection: one code tag plus a human message.
///
/// Kept flat on purpose. Callers route on [`GatewayError::code`]; the message
/// is for operators and never echoes the raw model candidate.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct GatewayError {
    pub code: ErrorCode,
    pub message: String,
}

impl GatewayError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_spelling_matches_serde() {
        let json = serde_json::to_value(ErrorCode::CteNotSupported).unwrap();
        assert_eq!(json, "CTE_NOT_SUPPORTED");
        assert_eq!(ErrorCode::CteNotSupported.as_str(), "CTE_NOT_SUPPORTED");

        let json = serde_json::to_value(ErrorCode::DbSchemaError).unwrap();
        assert_eq!(json, "DB_SCHEMA_ERROR");
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = GatewayError::new(ErrorCode::Wildcard, "star projections are not allowed");
        assert_eq!(
            err.to_string(),
            "WILDCARD: star projections are not allowed"
        );
    }
}
