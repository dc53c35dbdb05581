//! Read-only lexical guard.
//!
//! A pre-parse and post-serialize filter. Deliberately coarse: it may reject
//! SQL that would have been safe, and it fails fast. The serializer and the
//! executor re-apply it so no later stage can introduce a disallowed token.

use regex::Regex;
use sqlgate_core::{ErrorCode, GatewayError};

/// Statement keywords that never belong in a read path.
const DISALLOWED_KEYWORDS: &[&str] = &[
    "insert",
    "update",
    "delete",
    "drop",
    "alter",
    "truncate",
    "create",
    "grant",
    "revoke",
    "exec",
    "execute",
    "copy",
    "call",
    "do",
    "merge",
    "replace",
    "upsert",
    "vacuum",
    "analyze",
    "reindex",
    "cluster",
    "discard",
    "checkpoint",
];

/// Functions with side effects despite appearing in SELECT position.
const SIDE_EFFECT_FUNCTIONS: &[&str] = &[
    "nextval",
    "setval",
    "pg_advisory_lock",
    "pg_advisory_xact_lock",
    "pg_sleep",
];

/// Token-level rejection of forbidden constructs.
pub struct LexicalGuard {
    keywords: Regex,
    row_locks: Regex,
    side_effects: Regex,
}

impl LexicalGuard {
    pub fn new() -> Self {
        let keywords = Regex::new(&format!(r"(?i)\b(?:{})\b", DISALLOWED_KEYWORDS.join("|")))
            .expect("keyword pattern");
        let row_locks =
            Regex::new(r"(?i)\bfor\s+(?:update|share|no\s+key\s+update|key\s+share)\b")
                .expect("row lock pattern");
        let side_effects = Regex::new(&format!(
            r"(?i)\b(?:{})\s*\(",
            SIDE_EFFECT_FUNCTIONS.join("|")
        ))
        .expect("side effect pattern");
        Self {
            keywords,
            row_locks,
            side_effects,
        }
    }

    /// Reject the string if any forbidden token is present.
    pub fn check(&self, sql: &str) -> Result<(), GatewayError> {
        if sql.contains(';') {
            return Err(GatewayError::new(
                ErrorCode::Semicolon,
                "semicolons are not allowed",
            ));
        }
        if sql.contains("--") || sql.contains("/*") {
            return Err(GatewayError::new(
                ErrorCode::Comment,
                "SQL comments are not allowed",
            ));
        }
        // row locks first: `FOR UPDATE` must report ROW_LOCK, not the bare
        // `update` keyword
        if self.row_locks.is_match(sql) {
            return Err(GatewayError::new(
                ErrorCode::RowLock,
                "row locking clauses are not allowed",
            ));
        }
        if let Some(hit) = self.side_effects.find(sql) {
            let name = hit.as_str().trim_end_matches('(').trim_end();
            return Err(GatewayError::new(
                ErrorCode::SideEffectFn,
                format!("function with side effects: {}", name.to_lowercase()),
            ));
        }
        if let Some(hit) = self.keywords.find(sql) {
            return Err(GatewayError::new(
                ErrorCode::DisallowedKeyword,
                format!("disallowed keyword: {}", hit.as_str().to_lowercase()),
            ));
        }
        Ok(())
    }
}

impl Default for LexicalGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(sql: &str) -> ErrorCode {
        LexicalGuard::new().check(sql).unwrap_err().code
    }

    #[test]
    fn accepts_plain_select() {
        let guard = LexicalGuard::new();
        assert!(guard
            .check("SELECT u.id FROM users u WHERE u.name = 'ann' ORDER BY u.id")
            .is_ok());
    }

    #[test]
    fn rejects_semicolon_anywhere() {
        assert_eq!(code_of("SELECT 1;"), ErrorCode::Semicolon);
        assert_eq!(code_of("SELECT 1; DROP TABLE users"), ErrorCode::Semicolon);
    }

    #[test]
    fn rejects_comments() {
        assert_eq!(code_of("SELECT 1 -- sneaky"), ErrorCode::Comment);
        assert_eq!(code_of("SELECT /* hidden */ 1"), ErrorCode::Comment);
    }

    #[test]
    fn rejects_write_keywords_word_bounded() {
        assert_eq!(code_of("DELETE FROM users"), ErrorCode::DisallowedKeyword);
        assert_eq!(
            code_of("SELECT 1 FROM t WHERE exec = 1"),
            ErrorCode::DisallowedKeyword
        );
        // keyword embedded in a longer identifier does not match
        let guard = LexicalGuard::new();
        assert!(guard.check("SELECT create_time FROM events").is_ok());
        assert!(guard.check("SELECT updated_at FROM events").is_ok());
    }

    #[test]
    fn rejects_row_locks_whitespace_insensitive() {
        assert_eq!(code_of("SELECT * FROM t FOR UPDATE"), ErrorCode::RowLock);
        assert_eq!(
            code_of("SELECT * FROM t FOR  NO  KEY\tUPDATE"),
            ErrorCode::RowLock
        );
        assert_eq!(code_of("SELECT * FROM t for key share"), ErrorCode::RowLock);
    }

    #[test]
    fn rejects_side_effect_functions() {
        assert_eq!(
            code_of("SELECT nextval('seq_users')"),
            ErrorCode::SideEffectFn
        );
        assert_eq!(code_of("SELECT pg_sleep (10)"), ErrorCode::SideEffectFn);
        // similarly named columns are fine without the call parenthesis
        let guard = LexicalGuard::new();
        assert!(guard.check("SELECT pg_sleep_budget FROM quotas").is_ok());
    }
}
