//! LIMIT / OFFSET enforcement.
//!
//! The model may suggest a LIMIT but never an OFFSET; paging is entirely the
//! caller's. The emitted query always asks for one row more than the caller
//! will see, so the executor's caller can detect truncation.

use sqlgate_core::{ErrorCode, GatewayError};
use sqlparser::ast::{LimitClause, Offset, OffsetRows, Query};

use crate::ast::{number_expr, numeric_literal};

/// Limits computed for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Rows the caller will be shown.
    pub display_limit: u32,
    /// Rows requested from the database (`display_limit + 1`).
    pub fetch_limit: u32,
    /// Rows skipped (`(page - 1) * display_limit`).
    pub offset: u64,
}

/// Replace the query's LIMIT clause with `LIMIT fetch OFFSET skip`.
///
/// `display_limit = min(model_limit ?? page_size, page_size, hard_cap)`.
pub fn apply_pagination(
    query: &mut Query,
    page: u32,
    page_size: u32,
    hard_cap: u32,
) -> Result<PageLimits, GatewayError> {
    if page == 0 {
        return Err(GatewayError::new(
            ErrorCode::LimitInvalid,
            "page must be at least 1",
        ));
    }
    if page_size == 0 || page_size > 100 {
        return Err(GatewayError::new(
            ErrorCode::LimitInvalid,
            "pageSize must be between 1 and 100",
        ));
    }

    let model_limit = extract_model_limit(query)?;

    let mut display = i64::from(page_size.min(hard_cap));
    if let Some(model_limit) = model_limit {
        display = display.min(model_limit);
    }
    if display <= 0 {
        return Err(GatewayError::new(
            ErrorCode::LimitInvalid,
            "effective limit must be positive",
        ));
    }
    let display = display as u32;
    let offset = u64::from(page - 1) * u64::from(display);
    let fetch = display + 1;

    query.limit_clause = Some(LimitClause::LimitOffset {
        limit: Some(number_expr(u64::from(fetch))),
        offset: Some(Offset {
            value: number_expr(offset),
            rows: OffsetRows::None,
        }),
        limit_by: Vec::new(),
    });
    query.fetch = None;

    Ok(PageLimits {
        display_limit: display,
        fetch_limit: fetch,
        offset,
    })
}

/// The model-supplied limit, if any. Offsets in any spelling are refused.
fn extract_model_limit(query: &Query) -> Result<Option<i64>, GatewayError> {
    let mut model_limit: Option<i64> = None;

    match &query.limit_clause {
        None => {}
        Some(LimitClause::OffsetCommaLimit { .. }) => {
            return Err(offset_not_allowed());
        }
        Some(LimitClause::LimitOffset {
            limit,
            offset,
            limit_by,
        }) => {
            if offset.is_some() || !limit_by.is_empty() {
                return Err(offset_not_allowed());
            }
            if let Some(expr) = limit {
                model_limit = Some(parse_limit_value(expr)?);
            }
        }
    }

    // FETCH FIRST n ROWS ONLY is the ANSI spelling of LIMIT
    if let Some(fetch) = &query.fetch {
        if fetch.percent || fetch.with_ties {
            return Err(GatewayError::new(
                ErrorCode::LimitNotNumeric,
                "FETCH PERCENT and WITH TIES are not supported",
            ));
        }
        let fetched = match &fetch.quantity {
            Some(expr) => parse_limit_value(expr)?,
            None => 1,
        };
        model_limit = Some(match model_limit {
            Some(existing) => existing.min(fetched),
            None => fetched,
        });
    }

    Ok(model_limit)
}

fn parse_limit_value(expr: &sqlparser::ast::Expr) -> Result<i64, GatewayError> {
    let raw = numeric_literal(expr).ok_or_else(|| {
        GatewayError::new(
            ErrorCode::LimitNotNumeric,
            "LIMIT must be a numeric literal",
        )
    })?;
    let value: i64 = raw.parse().map_err(|_| {
        GatewayError::new(
            ErrorCode::LimitNotNumeric,
            "LIMIT must be a whole number",
        )
    })?;
    if value <= 0 {
        return Err(GatewayError::new(
            ErrorCode::LimitInvalid,
            "LIMIT must be positive",
        ));
    }
    Ok(value)
}

fn offset_not_allowed() -> GatewayError {
    GatewayError::new(
        ErrorCode::OffsetNotAllowed,
        "OFFSET is managed by the gateway, use the page parameter",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_select;

    fn paginate(sql: &str, page: u32, page_size: u32) -> Result<(PageLimits, String), GatewayError> {
        let mut query = parse_select(sql).unwrap();
        let limits = apply_pagination(&mut query, page, page_size, 100)?;
        Ok((limits, query.to_string()))
    }

    #[test]
    fn default_page_size_applies() {
        let (limits, sql) = paginate("SELECT u.id FROM users u", 1, 2).unwrap();
        assert_eq!(limits.display_limit, 2);
        assert_eq!(limits.fetch_limit, 3);
        assert_eq!(limits.offset, 0);
        assert!(sql.ends_with("LIMIT 3 OFFSET 0"));
    }

    #[test]
    fn model_limit_tightens_the_page() {
        let (limits, sql) = paginate("SELECT u.id FROM users u LIMIT 1", 1, 100).unwrap();
        assert_eq!(limits.display_limit, 1);
        assert_eq!(limits.fetch_limit, 2);
        assert!(sql.ends_with("LIMIT 2 OFFSET 0"));
    }

    #[test]
    fn model_limit_larger_than_page_is_clamped() {
        let (limits, _) = paginate("SELECT u.id FROM users u LIMIT 500", 1, 10).unwrap();
        assert_eq!(limits.display_limit, 10);
        assert_eq!(limits.fetch_limit, 11);
    }

    #[test]
    fn later_pages_shift_the_offset() {
        let (limits, sql) = paginate("SELECT u.id FROM users u", 3, 10).unwrap();
        assert_eq!(limits.offset, 20);
        assert!(sql.ends_with("LIMIT 11 OFFSET 20"));
    }

    #[test]
    fn model_offset_is_rejected() {
        let err = paginate("SELECT u.id FROM users u LIMIT 10 OFFSET 20", 1, 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::OffsetNotAllowed);
    }

    #[test]
    fn non_numeric_limit_is_rejected() {
        let err = paginate("SELECT u.id FROM users u LIMIT u.id", 1, 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::LimitNotNumeric);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = paginate("SELECT u.id FROM users u LIMIT 0", 1, 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::LimitInvalid);
    }

    #[test]
    fn fetch_first_is_treated_as_a_limit() {
        let (limits, sql) =
            paginate("SELECT u.id FROM users u FETCH FIRST 5 ROWS ONLY", 1, 10).unwrap();
        assert_eq!(limits.display_limit, 5);
        assert!(sql.ends_with("LIMIT 6 OFFSET 0"));
        assert!(!sql.contains("FETCH"));
    }

    #[test]
    fn page_bounds_are_validated() {
        let err = paginate("SELECT u.id FROM users u", 0, 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::LimitInvalid);
        let err = paginate("SELECT u.id FROM users u", 1, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::LimitInvalid);
        let err = paginate("SELECT u.id FROM users u", 1, 101).unwrap_err();
        assert_eq!(err.code, ErrorCode::LimitInvalid);
    }
}
