//! Row-mapping helpers shared by the plan and task queries.

use jiff::Timestamp;
use rusqlite::{types::Type, ErrorCode, Row};
use serde::de::DeserializeOwned;

use crate::{error::PlanError, models::TaskStatus};

/// Maps an insert failure: unique-key violations become
/// [`PlanError::Conflict`], everything else is a store failure.
pub(crate) fn map_insert_error(error: rusqlite::Error, id: &str, message: &str) -> PlanError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            PlanError::Conflict { id: id.to_string() }
        }
        _ => PlanError::store_unavailable(message).with_source(error),
    }
}

/// Reads a JSON-encoded text column.
pub(crate) fn json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads an RFC 3339 timestamp column.
pub(crate) fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(idx)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a status column.
pub(crate) fn status_column(row: &Row, idx: usize) -> rusqlite::Result<TaskStatus> {
    let status_str: String = row.get(idx)?;
    status_str.parse::<TaskStatus>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("Invalid status: {status_str}").into(),
        )
    })
}
