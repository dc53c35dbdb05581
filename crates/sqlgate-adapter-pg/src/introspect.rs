//! Schema introspection.
//!
//! Builds an immutable [`SchemaSnapshot`] from `information_schema`. System
//! schemas are excluded; base tables and views are both included so the
//! resolver can validate references against either. Refresh scheduling is the
//! embedding service's job: call this on its timer and hand the result to
//! [`sqlgate_schema::SchemaRegistry::replace`].

use chrono::Utc;
use sqlgate_schema::{SchemaSnapshot, SchemaTable};
use sqlx::{PgPool, Row};

/// Introspect the connected database into a snapshot.
pub async fn introspect_snapshot(
    pool: &PgPool,
    tenant_column: &str,
) -> anyhow::Result<SchemaSnapshot> {
    let table_rows = sqlx::query(
        r#"
        select table_schema, table_name, table_type
        from information_schema.tables
        where table_type in ('BASE TABLE', 'VIEW')
          and table_schema not in ('pg_catalog', 'information_schema')
        order by table_schema, table_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut tables = Vec::with_capacity(table_rows.len());
    for row in table_rows {
        let table_schema: String = row.get("table_schema");
        let table_name: String = row.get("table_name");
        let table_type: String = row.get("table_type");

        let column_rows = sqlx::query(
            r#"
            select column_name
            from information_schema.columns
            where table_schema = $1 and table_name = $2
            order by ordinal_position
            "#,
        )
        .bind(&table_schema)
        .bind(&table_name)
        .fetch_all(pool)
        .await?;

        let columns: Vec<String> = column_rows
            .into_iter()
            .map(|c| c.get::<String, _>("column_name"))
            .collect();

        tables.push(SchemaTable::new(
            table_schema,
            table_name,
            table_type == "VIEW",
            columns,
            tenant_column,
        ));
    }

    tracing::info!(tables = tables.len(), "Introspected schema snapshot");
    Ok(SchemaSnapshot::new(tables, tenant_column, Utc::now()))
}
