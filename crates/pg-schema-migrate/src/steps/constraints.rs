//! Constraint replication: re-issue source constraints against the target.

use crate::error::Result;
use crate::source::Constraint;
use crate::target::{qualify_table, quote_ident};
use tokio_postgres::Transaction;
use tracing::debug;

/// Rewrite every occurrence of the source-table identifier inside a
/// constraint definition to the replacement text.
///
/// The catalog renders the table either bare (`flights`) or schema-qualified
/// (`bookings.flights`) depending on the session's search path; both forms
/// are rewritten as one unit, never partially. Matches are identifier-boundary
/// aware: `bookings` never rewrites inside `bookings_old` or `old_bookings`,
/// and a bare match never fires on the table part of someone else's qualified
/// name. This handles self-referencing foreign keys and check constraints
/// that name their own table. References to other tables are left as the
/// catalog rendered them and resolve in the target session's search path
/// (the table-list ordering hazard documented for foreign keys).
pub fn rewrite_definition(
    definition: &str,
    source_schema: &str,
    source_table: &str,
    replacement: &str,
) -> String {
    if source_table.is_empty() {
        return definition.to_string();
    }

    let qualified = format!("{}.{}", source_schema, source_table);
    let bytes = definition.as_bytes();
    let mut out = String::with_capacity(definition.len());
    let mut i = 0;

    while i < definition.len() {
        // Longest form first: the qualified name contains the bare name.
        let end = match_at(definition, bytes, i, &qualified)
            .or_else(|| match_at(definition, bytes, i, source_table));

        if let Some(end) = end {
            out.push_str(replacement);
            i = end;
        } else if let Some(ch) = definition[i..].chars().next() {
            out.push(ch);
            i += ch.len_utf8();
        } else {
            break;
        }
    }

    out
}

/// Boundary-checked needle match at byte position `i`. A preceding `.` means
/// the needle is the tail of a qualified name that did not match as a whole,
/// so the position is rejected.
fn match_at(definition: &str, bytes: &[u8], i: usize, needle: &str) -> Option<usize> {
    if needle.is_empty() || !definition[i..].starts_with(needle) {
        return None;
    }

    let end = i + needle.len();
    let left_ok = i == 0 || (!is_ident_char(bytes[i - 1]) && bytes[i - 1] != b'.');
    let right_ok = end == bytes.len() || !is_ident_char(bytes[end]);

    if left_ok && right_ok {
        Some(end)
    } else {
        None
    }
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Replicate all source constraints onto the target table, in catalog order.
///
/// Constraint names are lower-cased and prefixed to avoid collisions with
/// the target schema's existing objects. No dependency ordering is applied
/// between constraints; a foreign key referencing a table migrated later in
/// the list surfaces as a database error here.
pub async fn replicate(
    tx: &Transaction<'_>,
    constraints: &[Constraint],
    source_schema: &str,
    source_table: &str,
    target_schema: &str,
    target_table: &str,
    prefix: &str,
) -> Result<()> {
    let qualified = qualify_table(target_schema, target_table);

    for constraint in constraints {
        let name = format!("{}{}", prefix, constraint.name.to_lowercase());
        let definition =
            rewrite_definition(&constraint.definition, source_schema, source_table, &qualified);

        let sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {}",
            qualified,
            quote_ident(&name),
            definition
        );
        tx.execute(&sql, &[]).await?;

        debug!(
            "Added constraint {} to {}.{}",
            name, target_schema, target_table
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_self_referencing_foreign_key() {
        let def = "FOREIGN KEY (parent_id) REFERENCES categories(id)";
        assert_eq!(
            rewrite_definition(def, "shop", "categories", "\"shop_new\".\"categories\""),
            "FOREIGN KEY (parent_id) REFERENCES \"shop_new\".\"categories\"(id)"
        );
    }

    #[test]
    fn test_rewrite_schema_qualified_reference() {
        // pg_get_constraintdef qualifies the table when the source schema is
        // not on the session's search path; the pair must rewrite as one unit.
        let def = "FOREIGN KEY (connecting_flight) REFERENCES bookings.flights(flight_id)";
        assert_eq!(
            rewrite_definition(def, "bookings", "flights", "\"bookings_new\".\"flights\""),
            "FOREIGN KEY (connecting_flight) REFERENCES \"bookings_new\".\"flights\"(flight_id)"
        );
    }

    #[test]
    fn test_rewrite_leaves_other_schemas_qualified_table_alone() {
        let def = "FOREIGN KEY (flight_id) REFERENCES archive.flights(flight_id)";
        assert_eq!(
            rewrite_definition(def, "bookings", "flights", "\"bookings_new\".\"flights\""),
            def
        );
    }

    #[test]
    fn test_rewrite_every_occurrence() {
        let def = "CHECK (flights.arrival > flights.departure)";
        assert_eq!(
            rewrite_definition(def, "bookings", "flights", "\"new\".\"flights\""),
            "CHECK (\"new\".\"flights\".arrival > \"new\".\"flights\".departure)"
        );
    }

    #[test]
    fn test_rewrite_respects_identifier_boundaries() {
        let def = "FOREIGN KEY (ref) REFERENCES bookings_old(book_ref)";
        // "bookings" must not match inside "bookings_old".
        assert_eq!(
            rewrite_definition(def, "demo", "bookings", "\"x\".\"bookings\""),
            def
        );
    }

    #[test]
    fn test_rewrite_no_occurrence_is_identity() {
        let def = "PRIMARY KEY (ticket_no, flight_id)";
        assert_eq!(
            rewrite_definition(def, "bookings", "ticket_flights", "anything"),
            def
        );
    }

    #[test]
    fn test_rewrite_at_definition_end() {
        let def = "FOREIGN KEY (seat_no) REFERENCES seats";
        assert_eq!(
            rewrite_definition(def, "bookings", "seats", "\"new\".\"seats\""),
            "FOREIGN KEY (seat_no) REFERENCES \"new\".\"seats\""
        );
    }
}
