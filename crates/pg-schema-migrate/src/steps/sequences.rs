//! Sequence synchronization: recreate the sequence backing an auto-increment
//! column and advance it past the copied data.
//!
//! The step is split in two. `create` runs in the pipeline's sequence
//! position, before data copy; `advance` runs after data copy so that
//! `max(column)` is computed over populated rows rather than an empty table.

use crate::error::Result;
use crate::target::{qualify_table, quote_ident, quote_literal};
use tokio_postgres::Transaction;
use tracing::debug;

/// A target-side sequence created for an auto-generated column, waiting to be
/// advanced once row data is in place.
#[derive(Debug, Clone)]
pub struct SequenceSync {
    /// Unqualified sequence name (prefix applied).
    pub name: String,

    /// The auto-generated column the sequence backs.
    pub column: String,
}

/// Deterministic sequence name from table and column, with prefix.
pub fn sequence_name(prefix: &str, target_table: &str, column: &str) -> String {
    format!("{}{}_{}_seq", prefix, target_table, column)
}

/// Create the target sequence for the table's auto-generated column.
/// No-op (returns `None`) when the table has no sequence-backed column.
pub async fn create(
    tx: &Transaction<'_>,
    sequence_column: Option<&str>,
    target_schema: &str,
    target_table: &str,
    prefix: &str,
) -> Result<Option<SequenceSync>> {
    let column = match sequence_column {
        Some(column) => column,
        None => return Ok(None),
    };

    let name = sequence_name(prefix, target_table, column);
    let sql = format!(
        "CREATE SEQUENCE {}.{}",
        quote_ident(target_schema),
        quote_ident(&name)
    );
    tx.execute(&sql, &[]).await?;

    debug!("Created sequence {}.{}", target_schema, name);
    Ok(Some(SequenceSync {
        name,
        column: column.to_string(),
    }))
}

/// Advance the sequence to the maximum value present in the target table, so
/// the next generated value cannot collide with migrated rows. Must run after
/// data copy; if the target table is empty there is nothing to advance past.
pub async fn advance(
    tx: &Transaction<'_>,
    sync: &SequenceSync,
    target_schema: &str,
    target_table: &str,
) -> Result<()> {
    let sql = format!(
        "SELECT MAX({})::bigint FROM {}",
        quote_ident(&sync.column),
        qualify_table(target_schema, target_table)
    );
    let row = tx.query_one(&sql, &[]).await?;
    let max: Option<i64> = row.get(0);

    let max = match max {
        Some(max) => max,
        None => return Ok(()),
    };

    let qualified = format!(
        "{}.{}",
        quote_ident(target_schema),
        quote_ident(&sync.name)
    );
    let sql = format!("SELECT setval({}, {})", quote_literal(&qualified), max);
    tx.query_one(&sql, &[]).await?;

    debug!(
        "Advanced sequence {}.{} to {}",
        target_schema, sync.name, max
    );
    Ok(())
}
