//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration.
    pub source: SourceConfig,

    /// Target database configuration.
    pub target: TargetConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Source database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Source schema (default: "public").
    #[serde(default = "default_public_schema")]
    pub schema: String,
}

/// Target database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Target schema (default: "public").
    #[serde(default = "default_public_schema")]
    pub schema: String,
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Tables to migrate, processed in exactly this order. Foreign keys
    /// between tables are only satisfiable if referenced tables come first.
    #[serde(default)]
    pub tables: Vec<String>,

    /// Naming prefix applied to target tables, constraints, and sequences
    /// to avoid collisions with existing objects (default: empty).
    #[serde(default)]
    pub prefix: String,

    /// Maximum connections per pool (default: 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<usize>,
}

impl MigrationConfig {
    /// Effective pool size. The run is strictly sequential, so a small pool
    /// is enough; one connection per side is checked out at a time.
    pub fn get_max_connections(&self) -> usize {
        self.max_connections.unwrap_or(2)
    }

    /// Target table name for a source table (prefix applied).
    pub fn target_table(&self, source_table: &str) -> String {
        format!("{}{}", self.prefix, source_table)
    }
}

// Default value functions for serde
fn default_pg_port() -> u16 {
    5432
}

fn default_public_schema() -> String {
    "public".to_string()
}
