//! Rendering and output re-validation.

use sqlgate_core::{ErrorCode, GatewayError};
use sqlparser::ast::Query;

use crate::guard::LexicalGuard;

/// Render the rewritten query and re-apply the lexical guard to the output.
///
/// A violation here is not user input: some rewrite stage produced SQL the
/// guard would never have let in, which is a bug in this crate.
pub fn serialize(query: &Query, guard: &LexicalGuard) -> Result<String, GatewayError> {
    let sql = query.to_string();
    if let Err(violation) = guard.check(&sql) {
        return Err(GatewayError::new(
            ErrorCode::InternalRewriteLeak,
            format!("rewritten SQL failed the lexical guard: {violation}"),
        ));
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_select;

    #[test]
    fn round_trips_a_clean_query() {
        let guard = LexicalGuard::new();
        let query = parse_select("SELECT u.id FROM users u ORDER BY u.id").unwrap();
        let sql = serialize(&query, &guard).unwrap();
        assert!(sql.starts_with("SELECT"));
        assert!(!sql.ends_with(';'));
    }

    #[test]
    fn flags_guard_violations_as_internal() {
        // a string literal smuggling a comment marker survives parsing and
        // serialization, so the output guard is what catches it
        let guard = LexicalGuard::new();
        let query = parse_select("SELECT '--' FROM users").unwrap();
        let err = serialize(&query, &guard).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalRewriteLeak);
    }
}
