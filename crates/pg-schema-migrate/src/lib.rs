//! # pg-schema-migrate
//!
//! PostgreSQL schema-to-schema migration library.
//!
//! Copies a fixed, ordered list of tables - structure, constraints, sequence
//! state, and row data - from a source schema into a target schema, table by
//! table, with per-table transactional commit:
//!
//! - **Structure replication** from catalog introspection
//! - **Constraint replication** including self-referencing foreign keys
//! - **Sequence re-synchronization** past the copied row data
//! - **Row copy** with type-aware literal encoding
//!
//! Each table commits independently. On the first failure the current table's
//! transaction is rolled back and the remaining tables are left untouched;
//! previously committed tables stay committed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pg_schema_migrate::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.yaml")?;
//!     let result = Orchestrator::new(config).await?.run().await?;
//!     println!("Migrated {}/{} tables", result.tables_committed, result.tables_total);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod source;
pub mod steps;
pub mod target;

// Re-exports for convenient access
pub use config::{Config, MigrationConfig, SourceConfig, TargetConfig};
pub use error::{MigrateError, Result};
pub use orchestrator::{MigrationResult, Orchestrator, TableOutcome, TableStatus};
pub use source::{Column, Constraint, SourcePool, TableStructure};
pub use target::{SqlValue, TargetPool};
