//! Structure replication: CREATE TABLE on the target from the source layout.

use crate::error::{MigrateError, Result};
use crate::source::TableStructure;
use crate::target::{self, qualify_table, quote_ident};
use tokio_postgres::Transaction;
use tracing::debug;

/// Build the CREATE TABLE statement for the target.
///
/// Each column renders as `"name" type` plus `(length)` when the type carries
/// a declared maximum length. No other type adaptation (precision, scale,
/// arrays, enum domains) is attempted. Column order follows the source's
/// ordinal positions exactly.
pub fn create_table_sql(
    structure: &TableStructure,
    target_schema: &str,
    target_table: &str,
) -> String {
    let columns: Vec<String> = structure
        .columns
        .iter()
        .map(|col| {
            let mut def = format!("{} {}", quote_ident(&col.name), col.data_type);
            if let Some(len) = col.max_length {
                if len > 0 {
                    def.push_str(&format!("({})", len));
                }
            }
            def
        })
        .collect();

    format!(
        "CREATE TABLE {} ({})",
        qualify_table(target_schema, target_table),
        columns.join(", ")
    )
}

/// Replicate the source table's structure into the target schema.
///
/// Fails with `AlreadyExists` before issuing any DDL if a table with the
/// target name is already present; this is a hard stop, never a merge.
pub async fn replicate(
    tx: &Transaction<'_>,
    structure: &TableStructure,
    target_schema: &str,
    target_table: &str,
) -> Result<()> {
    if target::table_exists(tx, target_schema, target_table).await? {
        return Err(MigrateError::AlreadyExists {
            schema: target_schema.to_string(),
            table: target_table.to_string(),
        });
    }

    let ddl = create_table_sql(structure, target_schema, target_table);
    tx.execute(&ddl, &[]).await?;

    debug!("Created table {}.{}", target_schema, target_table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Column;

    fn structure(columns: Vec<Column>) -> TableStructure {
        TableStructure {
            schema: "bookings".to_string(),
            name: "airports_data".to_string(),
            columns,
        }
    }

    #[test]
    fn test_create_table_sql_appends_length() {
        let s = structure(vec![
            Column {
                name: "airport_code".to_string(),
                data_type: "character".to_string(),
                max_length: Some(3),
            },
            Column {
                name: "airport_name".to_string(),
                data_type: "jsonb".to_string(),
                max_length: None,
            },
        ]);

        assert_eq!(
            create_table_sql(&s, "bookings_new", "airports_data"),
            "CREATE TABLE \"bookings_new\".\"airports_data\" \
             (\"airport_code\" character(3), \"airport_name\" jsonb)"
        );
    }

    #[test]
    fn test_create_table_sql_preserves_column_order() {
        let s = structure(vec![
            Column {
                name: "b".to_string(),
                data_type: "integer".to_string(),
                max_length: None,
            },
            Column {
                name: "a".to_string(),
                data_type: "text".to_string(),
                max_length: None,
            },
        ]);

        let sql = create_table_sql(&s, "t", "t1");
        let b_pos = sql.find("\"b\"").unwrap();
        let a_pos = sql.find("\"a\"").unwrap();
        assert!(b_pos < a_pos, "ordinal order must be preserved: {}", sql);
    }

    #[test]
    fn test_create_table_sql_ignores_zero_length() {
        let s = structure(vec![Column {
            name: "note".to_string(),
            data_type: "text".to_string(),
            max_length: Some(0),
        }]);

        assert_eq!(
            create_table_sql(&s, "t", "t1"),
            "CREATE TABLE \"t\".\"t1\" (\"note\" text)"
        );
    }
}
