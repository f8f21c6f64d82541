//! Database operations and SQLite management for plans and tasks.
//!
//! This module provides the low-level SQLite access behind
//! [`crate::store::SqliteStore`]. It handles connections, schema management
//! and the row mapping for plan records and tasks.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod migrations;
pub mod plan_queries;
pub mod task_queries;
pub mod utils;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
