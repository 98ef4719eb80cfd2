//! Schema descriptor types read from the source catalog.
//!
//! All metadata is transient: fetched fresh per table, never cached across
//! tables or runs.

use serde::{Deserialize, Serialize};

/// Ordered column layout of a source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStructure {
    /// Schema name.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Column definitions in ordinal position order.
    pub columns: Vec<Column>,
}

impl TableStructure {
    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Data type name as reported by the catalog (e.g. "character varying").
    pub data_type: String,

    /// Declared maximum length for character types.
    pub max_length: Option<i32>,
}

/// Constraint metadata: name plus the catalog's canonical definition text
/// (e.g. `FOREIGN KEY (...) REFERENCES ...`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint name.
    pub name: String,

    /// Constraint definition as rendered by `pg_get_constraintdef`.
    pub definition: String,
}
