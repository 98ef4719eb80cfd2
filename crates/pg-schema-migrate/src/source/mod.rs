//! Source database introspection and row reads.

mod types;

pub use types::*;

use crate::config::SourceConfig;
use crate::error::{MigrateError, Result};
use crate::target::value::{quote_ident, SqlValue};
use deadpool_postgres::{Client, Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{Config as PgConfig, NoTls};
use tracing::{debug, info};

/// Source connection pool with catalog introspection.
pub struct SourcePool {
    pool: Pool,
}

impl SourcePool {
    /// Create a new source pool and test the connection.
    pub async fn new(config: &SourceConfig, max_conns: usize) -> Result<Self> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        // Pin the search path so pg_get_constraintdef renders tables in the
        // source schema with bare identifiers instead of qualifying them.
        pg_config.options(&format!("-c search_path={}", config.schema));

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(max_conns)
            .build()
            .map_err(|e| MigrateError::pool(e, "creating source pool"))?;

        // Test connection
        let client = pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, "testing source connection"))?;
        client.simple_query("SELECT 1").await?;

        info!(
            "Connected to source: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self { pool })
    }

    async fn client(&self, context: &'static str) -> Result<Client> {
        self.pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, context))
    }

    /// Read the ordered column layout for a table.
    ///
    /// Fails with a catalog error if the table has no columns, which means it
    /// is missing or not visible to the configured user.
    pub async fn table_structure(&self, schema: &str, table: &str) -> Result<TableStructure> {
        let client = self.client("getting connection for table_structure").await?;

        let query = r#"
            SELECT
                column_name::text,
                data_type::text,
                character_maximum_length::int4
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
        "#;

        let rows = client.query(query, &[&schema, &table]).await?;
        if rows.is_empty() {
            return Err(MigrateError::catalog(
                format!("{}.{}", schema, table),
                "no columns found; table does not exist or is not visible",
            ));
        }

        let columns = rows
            .iter()
            .map(|row| Column {
                name: row.get(0),
                data_type: row.get(1),
                max_length: row.get(2),
            })
            .collect::<Vec<_>>();

        debug!("Loaded {} columns for {}.{}", columns.len(), schema, table);

        Ok(TableStructure {
            schema: schema.to_string(),
            name: table.to_string(),
            columns,
        })
    }

    /// Enumerate the table's constraints in catalog order: primary key,
    /// unique, check, and foreign key definitions alike.
    pub async fn constraints(&self, schema: &str, table: &str) -> Result<Vec<Constraint>> {
        let client = self.client("getting connection for constraints").await?;

        let query = r#"
            SELECT c.conname::text, pg_get_constraintdef(c.oid)
            FROM pg_catalog.pg_constraint c
            JOIN pg_catalog.pg_class t ON t.oid = c.conrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
            WHERE n.nspname = $1 AND t.relname = $2
            ORDER BY c.oid
        "#;

        let rows = client.query(query, &[&schema, &table]).await?;

        let constraints = rows
            .iter()
            .map(|row| Constraint {
                name: row.get(0),
                definition: row.get(1),
            })
            .collect::<Vec<_>>();

        debug!(
            "Loaded {} constraints for {}.{}",
            constraints.len(),
            schema,
            table
        );
        Ok(constraints)
    }

    /// First column whose default expression is backed by a sequence, if any.
    /// Multiple auto-increment columns on one table are not supported; only
    /// the first in ordinal order is reported.
    pub async fn sequence_column(&self, schema: &str, table: &str) -> Result<Option<String>> {
        let client = self.client("getting connection for sequence_column").await?;

        let query = r#"
            SELECT column_name::text
            FROM information_schema.columns
            WHERE table_schema = $1
              AND table_name = $2
              AND column_default LIKE 'nextval%'
            ORDER BY ordinal_position
            LIMIT 1
        "#;

        let rows = client.query(query, &[&schema, &table]).await?;
        let column = rows.first().map(|row| row.get::<_, String>(0));

        if let Some(ref column) = column {
            debug!("Sequence-backed column for {}.{}: {}", schema, table, column);
        }
        Ok(column)
    }

    /// Read every row of a table into memory, converting each value by the
    /// column's declared data type. No streaming; demo-scale by design.
    pub async fn read_rows(&self, structure: &TableStructure) -> Result<Vec<Vec<SqlValue>>> {
        let client = self.client("getting connection for read_rows").await?;

        let sql = format!(
            "SELECT * FROM {}.{}",
            quote_ident(&structure.schema),
            quote_ident(&structure.name)
        );

        let rows = client.query(&sql, &[]).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Vec::with_capacity(structure.columns.len());
            for (idx, col) in structure.columns.iter().enumerate() {
                let value = SqlValue::from_row(&row, idx, &col.data_type)
                    .map_err(|e| decode_error(&structure.full_name(), &col.name, e))?;
                values.push(value);
            }
            result.push(values);
        }

        debug!("Read {} rows from {}", result.len(), structure.full_name());
        Ok(result)
    }
}

/// Decode failures abort the table with the offending column named, rather
/// than degrading the value to null.
fn decode_error(table: &str, column: &str, e: impl std::fmt::Display) -> MigrateError {
    MigrateError::catalog(table, format!("cannot decode column '{}': {}", column, e))
}
