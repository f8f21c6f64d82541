//! Error types for the scheduler library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::TaskStatus;

/// Boxed error type carried by [`PlanError::StoreUnavailable`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Comprehensive error type for all plan and store operations.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Task id unknown to the plan or absent from the store
    #[error("Task with ID {id} not found")]
    TaskNotFound { id: String },
    /// Plan id absent from the store
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: String },
    /// Create of a record whose id already exists in the store
    #[error("Record with ID {id} already exists")]
    Conflict { id: String },
    /// Programming-contract violation (cycles, unknown predecessors, ...)
    #[error("Invariant violation: {reason}")]
    InvariantViolation { reason: String },
    /// Status write not permitted by the task lifecycle
    #[error("Task {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
    /// Transient failure talking to the backing store
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        #[source]
        source: BoxError,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating store errors with optional context.
pub struct StoreErrorBuilder {
    message: String,
}

impl StoreErrorBuilder {
    /// Create a new store error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source<E>(self, source: E) -> PlanError
    where
        E: Into<BoxError>,
    {
        PlanError::StoreUnavailable {
            message: self.message,
            source: source.into(),
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> PlanError {
        PlanError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PlanError {
    /// Creates a builder for store errors.
    pub fn store_unavailable(message: impl Into<String>) -> StoreErrorBuilder {
        StoreErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates an invariant violation with the given reason.
    pub fn invariant(reason: impl Into<String>) -> Self {
        PlanError::InvariantViolation {
            reason: reason.into(),
        }
    }

    /// Returns true for programming-contract violations that must not be
    /// retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlanError::InvariantViolation { .. } | PlanError::InvalidTransition { .. }
        )
    }

    /// Returns true for the NotFound family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PlanError::TaskNotFound { .. } | PlanError::PlanNotFound { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| PlanError::store_unavailable(message).with_source(e))
    }
}

/// Result type alias for plan operations
pub type Result<T> = std::result::Result<T, PlanError>;
