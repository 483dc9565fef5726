//! Encoding helpers shared by the query modules.

use jiff::Timestamp;
use rusqlite::types::Type;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{StoreError, StoreResult};

/// Serializes a document for the `document` column.
pub(crate) fn encode<T: Serialize>(id: &str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Corrupt {
        id: id.to_string(),
        source,
    })
}

/// Deserializes a stored document.
pub(crate) fn decode<T: DeserializeOwned>(id: &str, json: &str) -> StoreResult<T> {
    serde_json::from_str(json).map_err(|source| StoreError::Corrupt {
        id: id.to_string(),
        source,
    })
}

/// Microsecond key used for ordering columns.
pub(crate) fn micros(timestamp: Timestamp) -> i64 {
    timestamp.as_microsecond()
}

/// Parses a timestamp column, reporting failures as conversion errors.
pub(crate) fn parse_timestamp(column: usize, raw: &str) -> rusqlite::Result<Timestamp> {
    raw.parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Parses an enum stored as text via its `FromStr` impl.
pub(crate) fn parse_text<T>(column: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|message| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
        )
    })
}
