//! Table and column resolution against a schema snapshot.
//!
//! Walks the FROM list and every expression in the statement, resolves each
//! reference to the snapshot, and rewrites identifiers to their canonical
//! case (double-quoted, so Postgres does not fold them back). Canonicalizing
//! here is what lets the tenant injector assume the canonical tenant column
//! exists on each target table.

use std::collections::HashSet;

use regex::Regex;
use sqlgate_core::{ErrorCode, GatewayError};
use sqlgate_schema::{SchemaSnapshot, SchemaTable};
use sqlparser::ast::{
    Distinct, Expr, FunctionArg, FunctionArgExpr, FunctionArguments, GroupByExpr, Ident,
    JoinConstraint, JoinOperator, OrderByKind, Query, SelectItem, TableFactor, Value, WindowType,
};

use crate::ast::{ident_parts, object_name, quoted_ident};
use crate::parse::select_mut;

/// How a referenced table entered the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// One place where a tenant predicate must be injected.
#[derive(Debug, Clone)]
pub struct TenantTarget {
    /// Alias as it will appear in the emitted SQL.
    pub alias: String,
    /// Canonical-case tenant column on that table.
    pub tenant_column: String,
    /// Join that brought the reference in; `None` for a leading FROM table.
    pub join: Option<JoinKind>,
}

/// Result of a successful resolution pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Fully-qualified referenced tables, sorted and deduplicated, for audit.
    pub tables: Vec<String>,
    /// Tenant-bearing references, in FROM order, not yet deduplicated.
    pub tenant_targets: Vec<TenantTarget>,
}

/// Matcher for column names that must never leave the database.
pub struct SensitiveColumns {
    pattern: Regex,
}

impl SensitiveColumns {
    pub fn new() -> Self {
        // substring match on purpose: `password_hash`, `reset_token_expiry`
        // and friends are all caught
        let pattern = Regex::new(
            r"(?i)password|token|secret|apikey|api_key|refresh|salt|hash|credential|ssn|aadhaar|pan",
        )
        .expect("sensitive column pattern");
        Self { pattern }
    }

    pub fn matches(&self, column: &str) -> bool {
        self.pattern.is_match(column)
    }
}

impl Default for SensitiveColumns {
    fn default() -> Self {
        Self::new()
    }
}

struct ReferencedTable<'a> {
    alias: String,
    table: &'a SchemaTable,
    join: Option<JoinKind>,
}

struct ColumnScope<'a, 'b> {
    refs: &'b [ReferencedTable<'a>],
    select_aliases: &'b HashSet<String>,
}

/// Resolves and canonicalizes one parsed candidate.
pub struct Resolver<'a> {
    snapshot: &'a SchemaSnapshot,
    sensitive: &'a SensitiveColumns,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a SchemaSnapshot, sensitive: &'a SensitiveColumns) -> Self {
        Self {
            snapshot,
            sensitive,
        }
    }

    /// Resolve every table and column reference, rewriting identifiers to
    /// canonical case in place.
    pub fn resolve(&self, query: &mut Query) -> Result<Resolution, GatewayError> {
        let select = select_mut(query)?;

        // referenced tables, FROM order
        let mut refs: Vec<ReferencedTable<'a>> = Vec::new();
        for table_with_joins in &mut select.from {
            self.resolve_factor(&mut table_with_joins.relation, None, &mut refs)?;
            for join in &mut table_with_joins.joins {
                let kind = classify_join(&join.join_operator)?;
                self.resolve_factor(&mut join.relation, Some(kind), &mut refs)?;
            }
        }

        let select_aliases: HashSet<String> = select
            .projection
            .iter()
            .filter_map(|item| match item {
                SelectItem::ExprWithAlias { alias, .. } => Some(alias.value.to_lowercase()),
                _ => None,
            })
            .collect();
        let scope = ColumnScope {
            refs: &refs,
            select_aliases: &select_aliases,
        };

        for item in &mut select.projection {
            match item {
                SelectItem::UnnamedExpr(expr) => self.rewrite_expr(expr, &scope)?,
                SelectItem::ExprWithAlias { expr, .. } => self.rewrite_expr(expr, &scope)?,
                SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                    return Err(wildcard_error())
                }
            }
        }

        for table_with_joins in &mut select.from {
            for join in &mut table_with_joins.joins {
                match &mut join.join_operator {
                    JoinOperator::Join(constraint)
                    | JoinOperator::Inner(constraint)
                    | JoinOperator::Left(constraint)
                    | JoinOperator::LeftOuter(constraint) => {
                        if let JoinConstraint::On(expr) = constraint {
                            self.rewrite_expr(expr, &scope)?;
                        }
                    }
                    _ => {}
                }
            }
        }

        if let Some(Distinct::On(exprs)) = &mut select.distinct {
            for expr in exprs {
                self.rewrite_expr(expr, &scope)?;
            }
        }
        if let Some(expr) = &mut select.selection {
            self.rewrite_expr(expr, &scope)?;
        }
        if let GroupByExpr::Expressions(exprs, _) = &mut select.group_by {
            for expr in exprs {
                self.rewrite_expr(expr, &scope)?;
            }
        }
        if let Some(expr) = &mut select.having {
            self.rewrite_expr(expr, &scope)?;
        }

        if let Some(order_by) = &mut query.order_by {
            if let OrderByKind::Expressions(exprs) = &mut order_by.kind {
                for order_expr in exprs {
                    self.rewrite_expr(&mut order_expr.expr, &scope)?;
                }
            }
        }

        let tenant_column = self.snapshot.tenant_column();
        let mut tenant_targets = Vec::new();
        for reference in &refs {
            if !reference.table.has_tenant_key {
                continue;
            }
            if let Some(canonical) = reference.table.canonical_column(tenant_column) {
                tenant_targets.push(TenantTarget {
                    alias: reference.alias.clone(),
                    tenant_column: canonical.to_string(),
                    join: reference.join,
                });
            }
        }

        let mut tables: Vec<String> = refs
            .iter()
            .map(|reference| reference.table.qualified_name())
            .collect();
        tables.sort();
        tables.dedup();

        Ok(Resolution {
            tables,
            tenant_targets,
        })
    }

    fn resolve_factor(
        &self,
        factor: &mut TableFactor,
        join: Option<JoinKind>,
        refs: &mut Vec<ReferencedTable<'a>>,
    ) -> Result<(), GatewayError> {
        match factor {
            TableFactor::Table { name, alias, .. } => {
                let parts = ident_parts(name).ok_or_else(|| {
                    GatewayError::new(ErrorCode::TableMissing, "unsupported table name form")
                })?;
                let (schema_part, table_part) = match parts.as_slice() {
                    [table] => (None, (*table).clone()),
                    [schema, table] => (Some((*schema).clone()), (*table).clone()),
                    _ => {
                        return Err(GatewayError::new(
                            ErrorCode::TableMissing,
                            "table names deeper than schema.table are not supported",
                        ))
                    }
                };

                let table = self
                    .snapshot
                    .resolve_table(&table_part.value, schema_part.as_ref().map(|s| s.value.as_str()))
                    .ok_or_else(|| {
                        GatewayError::new(
                            ErrorCode::TableUnknown,
                            format!("unknown table: {}", table_part.value),
                        )
                    })?;

                // canonicalize the written name
                let mut canonical_parts = Vec::new();
                if schema_part.is_some() {
                    canonical_parts.push(quoted_ident(table.schema_name.clone()));
                }
                canonical_parts.push(quoted_ident(table.table_name.clone()));
                *name = object_name(canonical_parts);

                let alias_name = alias
                    .as_ref()
                    .map(|a| a.name.value.clone())
                    .unwrap_or_else(|| table.table_name.clone());
                refs.push(ReferencedTable {
                    alias: alias_name,
                    table,
                    join,
                });
                Ok(())
            }
            TableFactor::Derived { .. } => Err(GatewayError::new(
                ErrorCode::SubqueryNotSupported,
                "subqueries in FROM are not supported",
            )),
            _ => Err(GatewayError::new(
                ErrorCode::FromUnsupported,
                "FROM items must be plain table references",
            )),
        }
    }

    fn check_sensitive(&self, lower: &str, written: &str) -> Result<(), GatewayError> {
        if self.sensitive.matches(lower) {
            return Err(GatewayError::new(
                ErrorCode::SensitiveColumn,
                format!("column {written} is not readable"),
            ));
        }
        Ok(())
    }

    fn rewrite_unqualified(
        &self,
        ident: &mut Ident,
        scope: &ColumnScope<'a, '_>,
    ) -> Result<(), GatewayError> {
        let lower = ident.value.to_lowercase();
        self.check_sensitive(&lower, &ident.value)?;

        if scope.select_aliases.contains(&lower) {
            return Ok(());
        }

        let owners: Vec<&ReferencedTable<'a>> = scope
            .refs
            .iter()
            .filter(|reference| reference.table.has_column(&lower))
            .collect();
        match owners.as_slice() {
            [] if scope.refs.is_empty() => Err(GatewayError::new(
                ErrorCode::ColumnNoSource,
                format!("column {} has no source table", ident.value),
            )),
            [] => Err(GatewayError::new(
                ErrorCode::ColumnUnknown,
                format!("unknown column: {}", ident.value),
            )),
            [owner] => match owner.table.canonical_column(&lower) {
                Some(canonical) => {
                    *ident = quoted_ident(canonical);
                    Ok(())
                }
                None => Err(GatewayError::new(
                    ErrorCode::ColumnUnknown,
                    format!("unknown column: {}", ident.value),
                )),
            },
            _ => Err(GatewayError::new(
                ErrorCode::ColumnAmbiguous,
                format!("column {} is ambiguous, qualify it", ident.value),
            )),
        }
    }

    fn rewrite_qualified(
        &self,
        idents: &mut [Ident],
        scope: &ColumnScope<'a, '_>,
    ) -> Result<(), GatewayError> {
        if idents.len() != 2 {
            return Err(GatewayError::new(
                ErrorCode::ColumnUnsupported,
                "only alias.column references are supported",
            ));
        }
        let column_lower = idents[1].value.to_lowercase();
        self.check_sensitive(&column_lower, &idents[1].value)?;

        let qualifier_lower = idents[0].value.to_lowercase();
        let by_alias = scope
            .refs
            .iter()
            .find(|reference| reference.alias.to_lowercase() == qualifier_lower);
        let owner = match by_alias {
            Some(owner) => owner,
            None => {
                // fall back to an unambiguous bare table name
                let by_name: Vec<&ReferencedTable<'a>> = scope
                    .refs
                    .iter()
                    .filter(|reference| {
                        reference.table.table_name.to_lowercase() == qualifier_lower
                    })
                    .collect();
                match by_name.as_slice() {
                    [only] => *only,
                    _ => {
                        return Err(GatewayError::new(
                            ErrorCode::AliasUnknown,
                            format!("unknown table alias: {}", idents[0].value),
                        ))
                    }
                }
            }
        };

        match owner.table.canonical_column(&column_lower) {
            Some(canonical) => {
                idents[1] = quoted_ident(canonical);
                Ok(())
            }
            None => Err(GatewayError::new(
                ErrorCode::ColumnUnknown,
                format!(
                    "table {} has no column {}",
                    owner.table.table_name, idents[1].value
                ),
            )),
        }
    }

    fn rewrite_expr(&self, expr: &mut Expr, scope: &ColumnScope<'_, '_>) -> Result<(), GatewayError> {
        match expr {
            Expr::Identifier(ident) => self.rewrite_unqualified(ident, scope),
            Expr::CompoundIdentifier(idents) => self.rewrite_qualified(idents, scope),
            Expr::Wildcard(..) | Expr::QualifiedWildcard(..) => Err(wildcard_error()),
            Expr::Value(value) => match &value.value {
                Value::Placeholder(raw) => Err(GatewayError::new(
                    ErrorCode::ParameterNotAllowed,
                    format!("parameter placeholders are not allowed: {raw}"),
                )),
                _ => Ok(()),
            },
            Expr::Subquery(_) | Expr::InSubquery { .. } | Expr::Exists { .. } => {
                Err(GatewayError::new(
                    ErrorCode::SubqueryNotSupported,
                    "subqueries are not supported",
                ))
            }
            Expr::BinaryOp { left, right, .. } => {
                self.rewrite_expr(left, scope)?;
                self.rewrite_expr(right, scope)
            }
            Expr::UnaryOp { expr, .. } | Expr::Nested(expr) => self.rewrite_expr(expr, scope),
            Expr::IsNull(expr)
            | Expr::IsNotNull(expr)
            | Expr::IsTrue(expr)
            | Expr::IsNotTrue(expr)
            | Expr::IsFalse(expr)
            | Expr::IsNotFalse(expr)
            | Expr::IsUnknown(expr)
            | Expr::IsNotUnknown(expr) => self.rewrite_expr(expr, scope),
            Expr::IsDistinctFrom(left, right) | Expr::IsNotDistinctFrom(left, right) => {
                self.rewrite_expr(left, scope)?;
                self.rewrite_expr(right, scope)
            }
            Expr::Cast { expr, .. }
            | Expr::Extract { expr, .. }
            | Expr::Collate { expr, .. }
            | Expr::Ceil { expr, .. }
            | Expr::Floor { expr, .. } => self.rewrite_expr(expr, scope),
            Expr::Position { expr, r#in } => {
                self.rewrite_expr(expr, scope)?;
                self.rewrite_expr(r#in, scope)
            }
            Expr::Substring {
                expr,
                substring_from,
                substring_for,
                ..
            } => {
                self.rewrite_expr(expr, scope)?;
                if let Some(from) = substring_from {
                    self.rewrite_expr(from, scope)?;
                }
                if let Some(length) = substring_for {
                    self.rewrite_expr(length, scope)?;
                }
                Ok(())
            }
            Expr::Trim {
                expr, trim_what, ..
            } => {
                self.rewrite_expr(expr, scope)?;
                if let Some(what) = trim_what {
                    self.rewrite_expr(what, scope)?;
                }
                Ok(())
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                self.rewrite_expr(expr, scope)?;
                self.rewrite_expr(low, scope)?;
                self.rewrite_expr(high, scope)
            }
            Expr::InList { expr, list, .. } => {
                self.rewrite_expr(expr, scope)?;
                for item in list {
                    self.rewrite_expr(item, scope)?;
                }
                Ok(())
            }
            Expr::Like { expr, pattern, .. }
            | Expr::ILike { expr, pattern, .. }
            | Expr::SimilarTo { expr, pattern, .. } => {
                self.rewrite_expr(expr, scope)?;
                self.rewrite_expr(pattern, scope)
            }
            Expr::AnyOp { left, right, .. } | Expr::AllOp { left, right, .. } => {
                self.rewrite_expr(left, scope)?;
                self.rewrite_expr(right, scope)
            }
            Expr::AtTimeZone {
                timestamp,
                time_zone,
                ..
            } => {
                self.rewrite_expr(timestamp, scope)?;
                self.rewrite_expr(time_zone, scope)
            }
            Expr::Case {
                operand,
                conditions,
                else_result,
                ..
            } => {
                if let Some(operand) = operand {
                    self.rewrite_expr(operand, scope)?;
                }
                for when in conditions {
                    self.rewrite_expr(&mut when.condition, scope)?;
                    self.rewrite_expr(&mut when.result, scope)?;
                }
                if let Some(else_result) = else_result {
                    self.rewrite_expr(else_result, scope)?;
                }
                Ok(())
            }
            Expr::Function(function) => {
                match &mut function.args {
                    FunctionArguments::None => {}
                    FunctionArguments::Subquery(_) => {
                        return Err(GatewayError::new(
                            ErrorCode::SubqueryNotSupported,
                            "subqueries are not supported",
                        ))
                    }
                    FunctionArguments::List(list) => {
                        for arg in &mut list.args {
                            let arg_expr = match arg {
                                FunctionArg::Named { arg, .. } => arg,
                                FunctionArg::ExprNamed { arg, .. } => arg,
                                FunctionArg::Unnamed(arg) => arg,
                            };
                            match arg_expr {
                                FunctionArgExpr::Expr(expr) => self.rewrite_expr(expr, scope)?,
                                FunctionArgExpr::Wildcard
                                | FunctionArgExpr::QualifiedWildcard(_) => {
                                    return Err(wildcard_error())
                                }
                            }
                        }
                    }
                }
                if let Some(filter) = &mut function.filter {
                    self.rewrite_expr(filter, scope)?;
                }
                for order_expr in &mut function.within_group {
                    self.rewrite_expr(&mut order_expr.expr, scope)?;
                }
                if let Some(WindowType::WindowSpec(spec)) = &mut function.over {
                    for expr in &mut spec.partition_by {
                        self.rewrite_expr(expr, scope)?;
                    }
                    for order_expr in &mut spec.order_by {
                        self.rewrite_expr(&mut order_expr.expr, scope)?;
                    }
                }
                Ok(())
            }
            Expr::Tuple(exprs) => {
                for item in exprs {
                    self.rewrite_expr(item, scope)?;
                }
                Ok(())
            }
            Expr::Array(array) => {
                for item in &mut array.elem {
                    self.rewrite_expr(item, scope)?;
                }
                Ok(())
            }
            Expr::Interval(interval) => self.rewrite_expr(&mut interval.value, scope),
            // literals and anything exotic the Postgres dialect can still
            // produce are left untouched
            _ => Ok(()),
        }
    }
}

fn classify_join(operator: &JoinOperator) -> Result<JoinKind, GatewayError> {
    match operator {
        JoinOperator::Join(constraint) | JoinOperator::Inner(constraint) => match constraint {
            JoinConstraint::Natural => Err(join_unsupported("NATURAL")),
            JoinConstraint::Using(_) => Err(GatewayError::new(
                ErrorCode::JoinUnsupported,
                "USING joins are not supported, spell out the ON clause",
            )),
            _ => Ok(JoinKind::Inner),
        },
        JoinOperator::Left(constraint) | JoinOperator::LeftOuter(constraint) => match constraint {
            JoinConstraint::On(_) => Ok(JoinKind::Left),
            JoinConstraint::Natural => Err(join_unsupported("NATURAL")),
            _ => Err(GatewayError::new(
                ErrorCode::JoinUnsupported,
                "LEFT JOIN requires an ON clause",
            )),
        },
        JoinOperator::Right(_) | JoinOperator::RightOuter(_) => Err(join_unsupported("RIGHT")),
        JoinOperator::FullOuter(_) => Err(join_unsupported("FULL")),
        JoinOperator::CrossJoin => Err(join_unsupported("CROSS")),
        _ => Err(GatewayError::new(
            ErrorCode::JoinUnsupported,
            "unsupported join type",
        )),
    }
}

fn join_unsupported(kind: &str) -> GatewayError {
    GatewayError::new(
        ErrorCode::JoinUnsupported,
        format!("{kind} joins are not supported"),
    )
}

fn wildcard_error() -> GatewayError {
    GatewayError::new(
        ErrorCode::Wildcard,
        "star projections are not allowed, name the columns",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_select;
    use chrono::Utc;
    use sqlgate_schema::SchemaSnapshot;

    fn snapshot() -> SchemaSnapshot {
        let users = SchemaTable::new(
            "public",
            "users",
            false,
            vec![
                "id".to_string(),
                "name".to_string(),
                "organizationId".to_string(),
                "password".to_string(),
            ],
            "organizationId",
        );
        let payments = SchemaTable::new(
            "public",
            "payments",
            false,
            vec![
                "id".to_string(),
                "userId".to_string(),
                "amount".to_string(),
                "organizationId".to_string(),
            ],
            "organizationId",
        );
        let products = SchemaTable::new(
            "public",
            "products",
            false,
            vec!["id".to_string(), "sku".to_string()],
            "organizationId",
        );
        SchemaSnapshot::new(vec![users, payments, products], "organizationId", Utc::now())
    }

    fn resolve(sql: &str) -> Result<(Resolution, String), GatewayError> {
        let snapshot = snapshot();
        let sensitive = SensitiveColumns::new();
        let resolver = Resolver::new(&snapshot, &sensitive);
        let mut query = parse_select(sql)?;
        let resolution = resolver.resolve(&mut query)?;
        Ok((resolution, query.to_string()))
    }

    fn code_of(sql: &str) -> ErrorCode {
        resolve(sql).unwrap_err().code
    }

    #[test]
    fn canonicalizes_column_case() {
        let (_, sql) = resolve("SELECT u.organizationid FROM users u").unwrap();
        assert!(sql.contains("\"organizationId\""));
        assert!(!sql.contains("organizationid"));
    }

    #[test]
    fn unqualified_column_resolves_against_single_owner() {
        let (_, sql) = resolve("SELECT amount FROM payments").unwrap();
        assert!(sql.contains("\"amount\""));
    }

    #[test]
    fn ambiguous_unqualified_column_is_rejected() {
        assert_eq!(
            code_of("SELECT id FROM users u INNER JOIN payments p ON p.userid = u.id"),
            ErrorCode::ColumnAmbiguous
        );
    }

    #[test]
    fn select_alias_is_left_alone() {
        let (_, sql) =
            resolve("SELECT u.name AS display FROM users u ORDER BY display").unwrap();
        assert!(sql.contains("ORDER BY display"));
    }

    #[test]
    fn qualifier_falls_back_to_table_name() {
        let (_, sql) = resolve("SELECT users.id FROM users u").unwrap();
        assert!(sql.contains("\"id\""));
    }

    #[test]
    fn unknown_alias_is_rejected() {
        assert_eq!(code_of("SELECT x.id FROM users u"), ErrorCode::AliasUnknown);
    }

    #[test]
    fn unknown_table_and_column() {
        assert_eq!(code_of("SELECT id FROM invoices"), ErrorCode::TableUnknown);
        assert_eq!(code_of("SELECT u.shoe_size FROM users u"), ErrorCode::ColumnUnknown);
    }

    #[test]
    fn column_without_source() {
        assert_eq!(code_of("SELECT id"), ErrorCode::ColumnNoSource);
    }

    #[test]
    fn deep_compound_references_are_rejected() {
        assert_eq!(
            code_of("SELECT public.users.id FROM users"),
            ErrorCode::ColumnUnsupported
        );
        assert_eq!(
            code_of("SELECT t.id FROM warehouse.public.users t"),
            ErrorCode::TableMissing
        );
    }

    #[test]
    fn wildcards_are_rejected() {
        assert_eq!(code_of("SELECT * FROM users"), ErrorCode::Wildcard);
        assert_eq!(code_of("SELECT u.* FROM users u"), ErrorCode::Wildcard);
        assert_eq!(code_of("SELECT count(*) FROM users"), ErrorCode::Wildcard);
    }

    #[test]
    fn sensitive_columns_are_rejected() {
        assert_eq!(
            code_of("SELECT u.password FROM users u"),
            ErrorCode::SensitiveColumn
        );
        // substring match catches composites even when unknown to the schema
        assert_eq!(
            code_of("SELECT u.password_hash FROM users u"),
            ErrorCode::SensitiveColumn
        );
    }

    #[test]
    fn model_supplied_placeholders_are_rejected() {
        assert_eq!(
            code_of("SELECT u.id FROM users u WHERE u.id = $1"),
            ErrorCode::ParameterNotAllowed
        );
    }

    #[test]
    fn subqueries_are_rejected() {
        assert_eq!(
            code_of("SELECT t.id FROM (SELECT id FROM users) t"),
            ErrorCode::SubqueryNotSupported
        );
        assert_eq!(
            code_of("SELECT u.id FROM users u WHERE u.id IN (SELECT p.userid FROM payments p)"),
            ErrorCode::SubqueryNotSupported
        );
    }

    #[test]
    fn forbidden_join_kinds() {
        assert_eq!(
            code_of("SELECT p.id FROM users u RIGHT JOIN payments p ON p.userid = u.id"),
            ErrorCode::JoinUnsupported
        );
        assert_eq!(
            code_of("SELECT p.id FROM users u FULL JOIN payments p ON p.userid = u.id"),
            ErrorCode::JoinUnsupported
        );
        assert_eq!(
            code_of("SELECT p.id FROM users u CROSS JOIN payments p"),
            ErrorCode::JoinUnsupported
        );
        assert_eq!(
            code_of("SELECT p.id FROM users u NATURAL JOIN payments p"),
            ErrorCode::JoinUnsupported
        );
    }

    #[test]
    fn tenant_targets_carry_join_kind() {
        let (resolution, _) = resolve(
            "SELECT u.id, p.amount FROM users u LEFT JOIN payments p ON p.userid = u.id",
        )
        .unwrap();
        assert_eq!(resolution.tenant_targets.len(), 2);
        assert_eq!(resolution.tenant_targets[0].alias, "u");
        assert_eq!(resolution.tenant_targets[0].join, None);
        assert_eq!(resolution.tenant_targets[0].tenant_column, "organizationId");
        assert_eq!(resolution.tenant_targets[1].alias, "p");
        assert_eq!(resolution.tenant_targets[1].join, Some(JoinKind::Left));
    }

    #[test]
    fn tables_without_tenant_key_produce_no_target() {
        let (resolution, _) = resolve("SELECT sku FROM products").unwrap();
        assert!(resolution.tenant_targets.is_empty());
        assert_eq!(resolution.tables, vec!["public.products".to_string()]);
    }

    #[test]
    fn referenced_tables_are_qualified_sorted_and_deduped() {
        let (resolution, _) = resolve(
            "SELECT u.id, p.amount FROM users u INNER JOIN payments p ON p.userid = u.id",
        )
        .unwrap();
        assert_eq!(
            resolution.tables,
            vec!["public.payments".to_string(), "public.users".to_string()]
        );
    }
}
