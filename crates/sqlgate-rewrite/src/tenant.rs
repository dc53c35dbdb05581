//! Tenant predicate injection.
//!
//! Every tenant-bearing reference gets `alias.tenantColumn = $1`. Placement
//! is join-aware: a predicate for a LEFT-joined table goes into that join's
//! `ON` clause, because filtering it in `WHERE` would drop rows where the
//! outer side is NULL and silently collapse the join to an inner one.

use std::collections::HashSet;

use sqlgate_core::{ErrorCode, GatewayError};
use sqlparser::ast::{BinaryOperator, Expr, JoinConstraint, JoinOperator, Query, Select};

use crate::ast::{factor_alias, positional_param, quoted_ident};
use crate::parse::select_mut;
use crate::resolve::{JoinKind, TenantTarget};

/// Add tenant predicates for every target and return the positional
/// parameter list: one tenant-id entry when any predicate was injected,
/// empty otherwise.
pub fn inject_tenant_filters(
    query: &mut Query,
    targets: &[TenantTarget],
    tenant_id: &str,
) -> Result<Vec<String>, GatewayError> {
    let select = select_mut(query)?;

    let mut seen = HashSet::new();
    let mut injected = false;
    for target in targets {
        if !seen.insert(target.alias.to_lowercase()) {
            continue;
        }
        let predicate = tenant_predicate(&target.alias, &target.tenant_column);
        match target.join {
            Some(JoinKind::Left) => attach_to_join_on(select, &target.alias, predicate)?,
            _ => attach_to_where(select, predicate),
        }
        injected = true;
    }

    if injected {
        Ok(vec![tenant_id.to_string()])
    } else {
        Ok(Vec::new())
    }
}

/// `"alias"."TenantColumn" = $1`
fn tenant_predicate(alias: &str, tenant_column: &str) -> Expr {
    Expr::BinaryOp {
        left: Box::new(Expr::CompoundIdentifier(vec![
            quoted_ident(alias),
            quoted_ident(tenant_column),
        ])),
        op: BinaryOperator::Eq,
        right: Box::new(positional_param(1)),
    }
}

fn and(left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op: BinaryOperator::And,
        right: Box::new(right),
    }
}

fn attach_to_where(select: &mut Select, predicate: Expr) {
    select.selection = Some(match select.selection.take() {
        Some(existing) => and(existing, predicate),
        None => predicate,
    });
}

fn attach_to_join_on(
    select: &mut Select,
    alias: &str,
    predicate: Expr,
) -> Result<(), GatewayError> {
    let alias_lower = alias.to_lowercase();
    for table_with_joins in &mut select.from {
        for join in &mut table_with_joins.joins {
            let joined_alias = match factor_alias(&join.relation) {
                Some(joined_alias) => joined_alias,
                None => continue,
            };
            if joined_alias.to_lowercase() != alias_lower {
                continue;
            }
            if let JoinOperator::Left(constraint) | JoinOperator::LeftOuter(constraint) =
                &mut join.join_operator
            {
                if let JoinConstraint::On(existing) = constraint {
                    *existing = and(existing.clone(), predicate);
                    return Ok(());
                }
            }
        }
    }
    // the resolver guarantees a LEFT join with an ON clause for this alias
    Err(GatewayError::new(
        ErrorCode::JoinUnsupported,
        format!("no LEFT JOIN with an ON clause found for alias {alias}"),
    ))
}
