//! Structural helpers over the parser's AST.
//!
//! Every assumption about node shape lives here so a parser upgrade touches
//! one file.

use sqlparser::ast::{Expr, Ident, ObjectName, ObjectNamePart, TableFactor, Value};

/// The identifier parts of an object name, or `None` when any part is not a
/// plain identifier.
pub(crate) fn ident_parts(name: &ObjectName) -> Option<Vec<&Ident>> {
    name.0.iter().map(|part| part.as_ident()).collect()
}

/// Rebuild an object name from plain identifiers.
pub(crate) fn object_name(parts: Vec<Ident>) -> ObjectName {
    ObjectName(parts.into_iter().map(ObjectNamePart::Identifier).collect())
}

/// A canonical-case identifier, double-quoted so Postgres does not fold it.
pub(crate) fn quoted_ident(value: impl Into<String>) -> Ident {
    Ident::with_quote('"', value)
}

/// The effective alias of a FROM-list table factor: the explicit alias, or
/// the last part of the table name.
pub(crate) fn factor_alias(factor: &TableFactor) -> Option<String> {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            if let Some(alias) = alias {
                return Some(alias.name.value.clone());
            }
            ident_parts(name)?.last().map(|ident| ident.value.clone())
        }
        _ => None,
    }
}

/// The raw text of a numeric literal, if the expression is one.
pub(crate) fn numeric_literal(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Value(value) => match &value.value {
            Value::Number(raw, _) => Some(raw.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// A numeric literal expression.
pub(crate) fn number_expr(value: u64) -> Expr {
    Expr::Value(Value::Number(value.to_string(), false).with_empty_span())
}

/// A positional parameter expression (`$1`, `$2`, ...).
pub(crate) fn positional_param(index: usize) -> Expr {
    Expr::Value(Value::Placeholder(format!("${index}")).with_empty_span())
}
