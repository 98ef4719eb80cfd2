//! Target database operations.

pub mod value;

pub use value::{quote_ident, quote_literal, SqlValue};

use crate::config::TargetConfig;
use crate::error::{MigrateError, Result};
use deadpool_postgres::{Client, Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{Config as PgConfig, NoTls, Transaction};
use tracing::info;

/// Target connection pool. The orchestrator checks out one client per table
/// and opens the table's transaction on it.
pub struct TargetPool {
    pool: Pool,
}

impl TargetPool {
    /// Create a new target pool and test the connection.
    pub async fn new(config: &TargetConfig, max_conns: usize) -> Result<Self> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        // Bare table references inside replicated constraint definitions
        // resolve against the target schema, not the session default.
        pg_config.options(&format!("-c search_path={}", config.schema));

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(max_conns)
            .build()
            .map_err(|e| MigrateError::pool(e, "creating target pool"))?;

        // Test connection
        let client = pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, "testing target connection"))?;
        client.simple_query("SELECT 1").await?;

        info!(
            "Connected to target: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self { pool })
    }

    /// Check out a client from the pool.
    pub async fn client(&self, context: &'static str) -> Result<Client> {
        self.pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, context))
    }
}

/// Check whether a table exists in a schema, using the given transaction.
pub async fn table_exists(tx: &Transaction<'_>, schema: &str, table: &str) -> Result<bool> {
    let row = tx
        .query_one(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = $1 AND table_name = $2
            )",
            &[&schema, &table],
        )
        .await?;

    Ok(row.get(0))
}

/// Fully qualify a table name.
pub fn qualify_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}
