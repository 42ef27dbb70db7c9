//! Row decoding helpers for enum and JSON-encoded columns

use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;

/// Read a TEXT column and parse it into an enum
pub fn enum_column<T>(row: &Row, column: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Text,
            format!("invalid {}: {}", column, raw).into(),
        )
    })
}

/// Same as [`enum_column`] for nullable columns
pub fn optional_enum_column<T>(
    row: &Row,
    column: &str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(column)?;
    match raw {
        Some(raw) => parse(&raw).map(Some).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                Type::Text,
                format!("invalid {}: {}", column, raw).into(),
            )
        }),
        None => Ok(None),
    }
}

/// Read a TEXT column holding a JSON document
pub fn json_column<T: DeserializeOwned>(row: &Row, column: &str) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}
