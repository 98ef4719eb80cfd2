//! Data copy: read all source rows and insert them into the target.

use crate::error::Result;
use crate::source::{SourcePool, TableStructure};
use crate::target::value::{values_tuple, SqlValue};
use crate::target::qualify_table;
use tokio_postgres::Transaction;
use tracing::debug;

/// Build one positional INSERT statement for a row. No column list: values
/// must match the target table's column order as created by the structure
/// step, which mirrors the source's ordinal order.
pub fn insert_sql(target_schema: &str, target_table: &str, row: &[SqlValue]) -> String {
    format!(
        "INSERT INTO {} VALUES {}",
        qualify_table(target_schema, target_table),
        values_tuple(row)
    )
}

/// Copy every row from the source table into the target table.
///
/// The whole table is read into memory and written one INSERT per row.
/// Functionally correct but not throughput-optimized; fine for the
/// administrative, demo-scale migrations this tool targets.
pub async fn copy(
    source: &SourcePool,
    tx: &Transaction<'_>,
    structure: &TableStructure,
    target_schema: &str,
    target_table: &str,
) -> Result<u64> {
    let rows = source.read_rows(structure).await?;

    let mut copied = 0u64;
    for row in &rows {
        let sql = insert_sql(target_schema, target_table, row);
        tx.execute(&sql, &[]).await?;
        copied += 1;
    }

    debug!(
        "Copied {} rows into {}.{}",
        copied, target_schema, target_table
    );
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_positional() {
        let row = vec![
            SqlValue::String("SVO".to_string()),
            SqlValue::Json(serde_json::json!({"en": "Sheremetyevo"})),
            SqlValue::Null,
        ];

        assert_eq!(
            insert_sql("bookings_new", "airports_data", &row),
            "INSERT INTO \"bookings_new\".\"airports_data\" \
             VALUES ('SVO', '{\"en\":\"Sheremetyevo\"}', null)"
        );
    }

    #[test]
    fn test_insert_sql_escapes_values() {
        let row = vec![SqlValue::String("O'Hare".to_string())];
        assert_eq!(
            insert_sql("s", "t", &row),
            "INSERT INTO \"s\".\"t\" VALUES ('O''Hare')"
        );
    }
}
