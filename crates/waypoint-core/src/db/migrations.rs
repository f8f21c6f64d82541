//! Database schema initialization and versioning.

use crate::error::{DatabaseResultExt, PlanError, Result};

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Autosave and the agent loop may write concurrently.
        self.connection
            .busy_timeout(std::time::Duration::from_secs(5))
            .db_context("Failed to set busy timeout")?;

        let version: i64 = self
            .connection
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .db_context("Failed to read schema version")?;

        if version > SCHEMA_VERSION {
            return Err(PlanError::Configuration {
                message: format!(
                    "Database schema version {version} is newer than supported version {SCHEMA_VERSION}"
                ),
            });
        }

        if version == SCHEMA_VERSION {
            return Ok(());
        }

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.connection
            .execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
            .db_context("Failed to record schema version")?;

        Ok(())
    }
}
