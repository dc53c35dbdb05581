//! In-memory schema snapshot: tables, columns, case-folded lookup indices.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// SQL dialect the snapshot was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    PostgreSql,
}

/// Metadata for one physical table or view.
///
/// The constructor derives every case-folded structure from the ordered
/// column list, so the lowered set and the lower-to-canonical map cannot
/// disagree on membership.
#[derive(Debug, Clone)]
pub struct SchemaTable {
    pub schema_name: String,
    pub table_name: String,
    pub is_view: bool,
    /// Column names in declaration order, original case.
    pub column_names: Vec<String>,
    /// True iff the table carries the tenant column.
    pub has_tenant_key: bool,
    lower_columns: HashSet<String>,
    canonical_by_lower: HashMap<String, String>,
}

impl SchemaTable {
    pub fn new(
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        is_view: bool,
        column_names: Vec<String>,
        tenant_column: &str,
    ) -> Self {
        let mut lower_columns = HashSet::with_capacity(column_names.len());
        let mut canonical_by_lower = HashMap::with_capacity(column_names.len());
        for name in &column_names {
            let lower = name.to_lowercase();
            lower_columns.insert(lower.clone());
            canonical_by_lower.insert(lower, name.clone());
        }
        let has_tenant_key = lower_columns.contains(&tenant_column.to_lowercase());
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            is_view,
            column_names,
            has_tenant_key,
            lower_columns,
            canonical_by_lower,
        }
    }

    /// `schema.table` in original case.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }

    /// Lower-cased `schema.table`, the primary snapshot key.
    pub fn qualified_key(&self) -> String {
        self.qualified_name().to_lowercase()
    }

    /// Membership test on the lower-cased column name.
    pub fn has_column(&self, lower_name: &str) -> bool {
        self.lower_columns.contains(lower_name)
    }

    /// Original-case spelling of a column, looked up by lower-cased name.
    pub fn canonical_column(&self, lower_name: &str) -> Option<&str> {
        self.canonical_by_lower.get(lower_name).map(String::as_str)
    }
}

/// An immutable view of the database schema.
///
/// Built atomically by the introspector and shared read-only; a new snapshot
/// fully replaces the old one via [`crate::SchemaRegistry::replace`].
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    pub dialect: SqlDialect,
    pub refreshed_at: DateTime<Utc>,
    tenant_column_lower: String,
    tables: Vec<SchemaTable>,
    by_qualified: HashMap<String, usize>,
    by_bare: HashMap<String, Vec<usize>>,
}

impl SchemaSnapshot {
    pub fn new(
        tables: Vec<SchemaTable>,
        tenant_column: &str,
        refreshed_at: DateTime<Utc>,
    ) -> Self {
        let mut by_qualified = HashMap::with_capacity(tables.len());
        let mut by_bare: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, table) in tables.iter().enumerate() {
            by_qualified.insert(table.qualified_key(), index);
            by_bare
                .entry(table.table_name.to_lowercase())
                .or_default()
                .push(index);
        }
        Self {
            dialect: SqlDialect::PostgreSql,
            refreshed_at,
            tenant_column_lower: tenant_column.to_lowercase(),
            tables,
            by_qualified,
            by_bare,
        }
    }

    /// The lower-cased tenant column this snapshot was built with.
    pub fn tenant_column(&self) -> &str {
        &self.tenant_column_lower
    }

    pub fn tables(&self) -> &[SchemaTable] {
        &self.tables
    }

    /// Resolve a table reference.
    ///
    /// With an explicit schema the composite key must match exactly. A bare
    /// name that collides across schemas resolves to the `public` table if
    /// one exists; otherwise the reference is ambiguous and treated as
    /// unknown.
    pub fn resolve_table(&self, name: &str, schema: Option<&str>) -> Option<&SchemaTable> {
        match schema {
            Some(schema) => {
                let key = format!("{}.{}", schema.to_lowercase(), name.to_lowercase());
                self.by_qualified.get(&key).map(|&i| &self.tables[i])
            }
            None => {
                let hits = self.by_bare.get(&name.to_lowercase())?;
                match hits.as_slice() {
                    [] => None,
                    [only] => Some(&self.tables[*only]),
                    many => many
                        .iter()
                        .map(|&i| &self.tables[i])
                        .find(|t| t.schema_name.eq_ignore_ascii_case("public")),
                }
            }
        }
    }

    /// Render the snapshot for the model prompt: one `schema.table (cols)`
    /// line per table, views first, then base tables, snapshot order within
    /// each group.
    pub fn format_for_prompt(&self) -> String {
        let mut out = String::new();
        let views = self.tables.iter().filter(|t| t.is_view);
        let base = self.tables.iter().filter(|t| !t.is_view);
        for table in views.chain(base) {
            out.push_str(&table.qualified_name());
            out.push_str(" (");
            out.push_str(&table.column_names.join(", "));
            out.push_str(")\n");
        }
        out
    }
}
