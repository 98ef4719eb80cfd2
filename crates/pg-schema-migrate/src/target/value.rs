//! SQL value representation and literal encoding.
//!
//! Every value read from a source row is converted to a [`SqlValue`] based on
//! the column's declared data type, then rendered as SQL literal text for the
//! generated INSERT statements. Values are escaped when rendered; identifiers
//! have their own quoting rule since they cannot be parameter-bound.

use tokio_postgres::Row;

/// A single scalar value read from a source row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(rust_decimal::Decimal),
    String(String),
    Uuid(uuid::Uuid),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    DateTime(chrono::NaiveDateTime),
    DateTimeOffset(chrono::DateTime<chrono::FixedOffset>),
    Json(serde_json::Value),
}

impl SqlValue {
    /// Convert one cell of a result row based on the column's declared type
    /// (as reported by `information_schema.columns.data_type`).
    ///
    /// A decode failure is an error, never a silent `Null`: a column the
    /// chosen variant cannot represent must abort the table rather than
    /// migrate rows with values replaced by nulls.
    pub fn from_row(
        row: &Row,
        idx: usize,
        data_type: &str,
    ) -> Result<SqlValue, tokio_postgres::Error> {
        match data_type {
            "boolean" => cell(row, idx, SqlValue::Bool),
            "smallint" => cell(row, idx, SqlValue::I16),
            "integer" => cell(row, idx, SqlValue::I32),
            "bigint" => cell(row, idx, SqlValue::I64),
            "real" => cell(row, idx, SqlValue::F32),
            "double precision" => cell(row, idx, SqlValue::F64),
            "numeric" => cell(row, idx, SqlValue::Decimal),
            "uuid" => cell(row, idx, SqlValue::Uuid),
            "date" => cell(row, idx, SqlValue::Date),
            "time without time zone" => cell(row, idx, SqlValue::Time),
            "timestamp without time zone" => cell(row, idx, SqlValue::DateTime),
            "timestamp with time zone" => cell(row, idx, SqlValue::DateTimeOffset),
            "json" | "jsonb" => cell(row, idx, SqlValue::Json),
            // char, varchar, text, and anything unrecognized: textual fallback
            _ => cell(row, idx, SqlValue::String),
        }
    }

    /// Render the value as SQL literal text for an INSERT statement.
    ///
    /// Null and numeric kinds are unquoted; textual, temporal, and JSON kinds
    /// are single-quoted with embedded quotes doubled.
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null => "null".to_string(),
            SqlValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            SqlValue::I16(n) => n.to_string(),
            SqlValue::I32(n) => n.to_string(),
            SqlValue::I64(n) => n.to_string(),
            SqlValue::F32(n) => float_literal(n.is_finite(), n.to_string()),
            SqlValue::F64(n) => float_literal(n.is_finite(), n.to_string()),
            SqlValue::Decimal(d) => d.to_string(),
            SqlValue::String(s) => quote_literal(s),
            SqlValue::Uuid(u) => quote_literal(&u.to_string()),
            SqlValue::Date(d) => quote_literal(&d.to_string()),
            SqlValue::Time(t) => quote_literal(&t.to_string()),
            SqlValue::DateTime(dt) => {
                quote_literal(&dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
            }
            SqlValue::DateTimeOffset(dt) => quote_literal(&dt.to_rfc3339()),
            SqlValue::Json(v) => quote_literal(&v.to_string()),
        }
    }
}

/// Decode a nullable cell. SQL NULL is the only path to `SqlValue::Null`;
/// a wire value that does not decode through `T` propagates as an error.
fn cell<'a, T>(
    row: &'a Row,
    idx: usize,
    variant: fn(T) -> SqlValue,
) -> Result<SqlValue, tokio_postgres::Error>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    Ok(match row.try_get::<_, Option<T>>(idx)? {
        Some(v) => variant(v),
        None => SqlValue::Null,
    })
}

/// PostgreSQL only accepts the non-finite float spellings (`NaN`, `inf`,
/// `-inf`) as quoted strings; finite values stay unquoted numeric text.
fn float_literal(finite: bool, text: String) -> String {
    if finite {
        text
    } else {
        quote_literal(&text)
    }
}

/// Quote and escape a string as a SQL literal (embedded `'` doubled).
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote a PostgreSQL identifier (embedded `"` doubled).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Join a row's literals into one VALUES tuple: `(a, b, c)`.
pub fn values_tuple(row: &[SqlValue]) -> String {
    let literals: Vec<String> = row.iter().map(SqlValue::to_literal).collect();
    format!("({})", literals.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::str::FromStr;

    #[test]
    fn test_null_literal() {
        assert_eq!(SqlValue::Null.to_literal(), "null");
    }

    #[test]
    fn test_numeric_literals_round_trip() {
        assert_eq!(SqlValue::I32(42).to_literal().parse::<i32>().unwrap(), 42);
        assert_eq!(
            SqlValue::I64(-7_000_000_000)
                .to_literal()
                .parse::<i64>()
                .unwrap(),
            -7_000_000_000
        );
        assert_eq!(
            SqlValue::F64(1.5).to_literal().parse::<f64>().unwrap(),
            1.5
        );
        let d = rust_decimal::Decimal::from_str("12345.6789").unwrap();
        assert_eq!(SqlValue::Decimal(d).to_literal(), "12345.6789");
    }

    #[test]
    fn test_string_literal_quoted() {
        assert_eq!(
            SqlValue::String("Sheremetyevo".to_string()).to_literal(),
            "'Sheremetyevo'"
        );
    }

    #[test]
    fn test_string_literal_escapes_embedded_quote() {
        // The original tool emitted the quote verbatim and produced broken
        // SQL; escaping by doubling keeps the statement well-formed.
        assert_eq!(
            SqlValue::String("O'Hare".to_string()).to_literal(),
            "'O''Hare'"
        );
    }

    #[test]
    fn test_nonfinite_float_literals_quoted() {
        assert_eq!(SqlValue::F64(f64::NAN).to_literal(), "'NaN'");
        assert_eq!(SqlValue::F64(f64::INFINITY).to_literal(), "'inf'");
        assert_eq!(SqlValue::F64(f64::NEG_INFINITY).to_literal(), "'-inf'");
        assert_eq!(SqlValue::F32(f32::NAN).to_literal(), "'NaN'");
        // Finite floats stay unquoted.
        assert_eq!(SqlValue::F64(1.5).to_literal(), "1.5");
    }

    #[test]
    fn test_bool_literal() {
        assert_eq!(SqlValue::Bool(true).to_literal(), "true");
        assert_eq!(SqlValue::Bool(false).to_literal(), "false");
    }

    #[test]
    fn test_temporal_literals() {
        let date = NaiveDate::from_ymd_opt(2017, 8, 15).unwrap();
        assert_eq!(SqlValue::Date(date).to_literal(), "'2017-08-15'");

        let time = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(SqlValue::Time(time).to_literal(), "'10:30:00'");

        let dt = date.and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(
            SqlValue::DateTime(dt).to_literal(),
            "'2017-08-15 10:30:00.000000'"
        );
    }

    #[test]
    fn test_json_literal_serialized_then_quoted() {
        let v = serde_json::json!({"en": "Domodedovo", "ru": "Домодедово"});
        let literal = SqlValue::Json(v.clone()).to_literal();
        assert!(literal.starts_with('\'') && literal.ends_with('\''));
        let inner = &literal[1..literal.len() - 1];
        assert_eq!(serde_json::from_str::<serde_json::Value>(inner).unwrap(), v);
    }

    #[test]
    fn test_values_tuple_join() {
        let row = vec![
            SqlValue::I32(1),
            SqlValue::String("a".to_string()),
            SqlValue::Null,
        ];
        assert_eq!(values_tuple(&row), "(1, 'a', null)");
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
