//! Migration orchestrator - drives the per-table pipeline.
//!
//! For each table in configured list order: begin a transaction on the
//! target, run structure, constraints, sequence creation, data copy, and
//! sequence advance, then commit. The first failure rolls back that table's
//! transaction and stops the run; tables committed before it stay committed.

use crate::config::Config;
use crate::error::Result;
use crate::source::SourcePool;
use crate::steps;
use crate::target::TargetPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Per-table lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Not yet processed (or skipped after an earlier failure).
    Pending,

    /// Transaction open, pipeline in flight.
    InTransaction,

    /// All steps succeeded and the transaction committed.
    Committed,

    /// A step failed; the transaction was rolled back.
    Aborted,
}

/// Outcome of a single table's migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableOutcome {
    /// Source table name.
    pub table: String,

    /// Final state.
    pub status: TableStatus,

    /// Rows copied (0 unless committed).
    pub rows_copied: u64,

    /// Error text for aborted tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status: "completed" or "failed".
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Total tables configured.
    pub tables_total: usize,

    /// Tables committed.
    pub tables_committed: usize,

    /// Total rows copied across committed tables.
    pub rows_copied: u64,

    /// Per-table outcomes, in list order.
    pub outcomes: Vec<TableOutcome>,
}

impl MigrationResult {
    /// Whether every table committed.
    pub fn is_success(&self) -> bool {
        self.status == "completed"
    }

    /// The aborted table's outcome, if the run failed.
    pub fn failure(&self) -> Option<&TableOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.status == TableStatus::Aborted)
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Migration orchestrator.
pub struct Orchestrator {
    config: Config,
    source: SourcePool,
    target: TargetPool,
}

impl Orchestrator {
    /// Create a new orchestrator and connect both pools.
    pub async fn new(config: Config) -> Result<Self> {
        let max_conns = config.migration.get_max_connections();
        let source = SourcePool::new(&config.source, max_conns).await?;
        let target = TargetPool::new(&config.target, max_conns).await?;

        Ok(Self {
            config,
            source,
            target,
        })
    }

    /// Run the migration: tables in configured order, one transaction per
    /// table, abort the remaining run on first failure.
    pub async fn run(self) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let tables = self.config.migration.tables.clone();
        let total = tables.len();

        info!("Starting migration run {}: {} tables", run_id, total);

        let mut outcomes: Vec<TableOutcome> = Vec::with_capacity(total);
        let mut failed = false;

        for (i, table) in tables.iter().enumerate() {
            if failed {
                // Abort-on-first-failure: remaining tables stay untouched.
                outcomes.push(TableOutcome {
                    table: table.clone(),
                    status: TableStatus::Pending,
                    rows_copied: 0,
                    error: None,
                });
                continue;
            }

            info!(
                "Migrating table {} ({}/{}, {:.1}%)",
                table,
                i + 1,
                total,
                (i + 1) as f64 / total as f64 * 100.0
            );

            match self.migrate_table(table).await {
                Ok(rows_copied) => {
                    info!("Table {} migrated ({} rows)", table, rows_copied);
                    outcomes.push(TableOutcome {
                        table: table.clone(),
                        status: TableStatus::Committed,
                        rows_copied,
                        error: None,
                    });
                }
                Err(e) => {
                    error!("Failed to migrate table {}: {}", table, e);
                    outcomes.push(TableOutcome {
                        table: table.clone(),
                        status: TableStatus::Aborted,
                        rows_copied: 0,
                        error: Some(e.to_string()),
                    });
                    failed = true;
                }
            }
        }

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let tables_committed = outcomes
            .iter()
            .filter(|o| o.status == TableStatus::Committed)
            .count();
        let rows_copied = outcomes.iter().map(|o| o.rows_copied).sum();

        let status = if failed { "failed" } else { "completed" };

        let result = MigrationResult {
            run_id,
            status: status.to_string(),
            duration_seconds: duration,
            started_at,
            completed_at,
            tables_total: total,
            tables_committed,
            rows_copied,
            outcomes,
        };

        info!(
            "Migration {}: {}/{} tables, {} rows in {:.1}s",
            result.status,
            result.tables_committed,
            result.tables_total,
            result.rows_copied,
            result.duration_seconds
        );

        Ok(result)
    }

    /// Migrate a single table inside one target transaction.
    ///
    /// Any error unwinds to the caller; dropping the open transaction rolls
    /// back every statement this table issued, including its CREATE TABLE.
    async fn migrate_table(&self, source_table: &str) -> Result<u64> {
        let source_schema = &self.config.source.schema;
        let target_schema = &self.config.target.schema;
        let prefix = &self.config.migration.prefix;
        let target_table = self.config.migration.target_table(source_table);

        // Metadata is fetched fresh per table, never cached across tables.
        let structure = self
            .source
            .table_structure(source_schema, source_table)
            .await?;
        let constraints = self.source.constraints(source_schema, source_table).await?;
        let sequence_column = self
            .source
            .sequence_column(source_schema, source_table)
            .await?;

        let mut client = self.target.client("checking out target connection").await?;
        let tx = client.transaction().await?;
        debug!("{}: in transaction", source_table);

        steps::structure::replicate(&tx, &structure, target_schema, &target_table).await?;
        steps::constraints::replicate(
            &tx,
            &constraints,
            source_schema,
            source_table,
            target_schema,
            &target_table,
            prefix,
        )
        .await?;
        let sequence =
            steps::sequences::create(&tx, sequence_column.as_deref(), target_schema, &target_table, prefix)
                .await?;
        let rows_copied =
            steps::data::copy(&self.source, &tx, &structure, target_schema, &target_table).await?;
        if let Some(ref sequence) = sequence {
            steps::sequences::advance(&tx, sequence, target_schema, &target_table).await?;
        }

        tx.commit().await?;
        Ok(rows_copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(table: &str, status: TableStatus, rows: u64) -> TableOutcome {
        TableOutcome {
            table: table.to_string(),
            status,
            rows_copied: rows,
            error: if status == TableStatus::Aborted {
                Some("boom".to_string())
            } else {
                None
            },
        }
    }

    fn result_with(outcomes: Vec<TableOutcome>, status: &str) -> MigrationResult {
        let now = Utc::now();
        MigrationResult {
            run_id: "test".to_string(),
            status: status.to_string(),
            duration_seconds: 0.0,
            started_at: now,
            completed_at: now,
            tables_total: outcomes.len(),
            tables_committed: outcomes
                .iter()
                .filter(|o| o.status == TableStatus::Committed)
                .count(),
            rows_copied: outcomes.iter().map(|o| o.rows_copied).sum(),
            outcomes,
        }
    }

    #[test]
    fn test_failure_reports_aborted_table() {
        let result = result_with(
            vec![
                outcome("first", TableStatus::Committed, 3),
                outcome("second", TableStatus::Aborted, 0),
                outcome("third", TableStatus::Pending, 0),
            ],
            "failed",
        );

        assert!(!result.is_success());
        let failure = result.failure().expect("aborted outcome");
        assert_eq!(failure.table, "second");
        assert_eq!(failure.error.as_deref(), Some("boom"));
        // Tables committed before the failure stay committed.
        assert_eq!(result.tables_committed, 1);
        assert_eq!(result.rows_copied, 3);
    }

    #[test]
    fn test_success_has_no_failure() {
        let result = result_with(vec![outcome("only", TableStatus::Committed, 7)], "completed");
        assert!(result.is_success());
        assert!(result.failure().is_none());
    }

    #[test]
    fn test_result_serializes_to_json() {
        let result = result_with(vec![outcome("t", TableStatus::Committed, 1)], "completed");
        let json = result.to_json().expect("serializable");
        assert!(json.contains("\"status\": \"completed\""));
        assert!(json.contains("\"rows_copied\": 1"));
    }
}
