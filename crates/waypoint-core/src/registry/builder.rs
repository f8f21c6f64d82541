//! Builder for creating and configuring PlanRegistry instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::task;

use super::PlanRegistry;
use crate::{
    config::PlanConfig,
    error::{PlanError, Result},
    models::FailurePolicy,
    store::{SharedStore, SqliteStore},
};

/// Builder for creating and configuring [`PlanRegistry`] instances.
#[derive(Clone, Default)]
pub struct PlanRegistryBuilder {
    database_path: Option<PathBuf>,
    store: Option<SharedStore>,
    config: PlanConfig,
}

impl PlanRegistryBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/waypoint/waypoint.db` or
    /// `~/.local/share/waypoint/waypoint.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Uses an existing store adapter instead of a SQLite file.
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Number of tasks each plan keeps loaded.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Starts an autosave loop for every plan the registry creates.
    pub fn with_autosave(mut self, every: Duration) -> Self {
        self.config.autosave_interval = Some(every);
        self
    }

    /// Builds the configured registry.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::InvalidInput` for a zero cache capacity or
    /// autosave interval
    /// Returns `PlanError::FileSystem` if the database path is invalid
    /// Returns `PlanError::StoreUnavailable` if database initialization fails
    pub async fn build(self) -> Result<PlanRegistry> {
        if self.config.cache_capacity == 0 {
            return Err(PlanError::invalid_input("cache_capacity").with_reason("must be at least 1"));
        }
        if self.config.autosave_interval == Some(Duration::ZERO) {
            return Err(PlanError::invalid_input("autosave_interval").with_reason("must not be zero"));
        }

        let store = match self.store {
            Some(store) => store,
            None => {
                let db_path = match self.database_path {
                    Some(path) => path,
                    None => Self::default_database_path()?,
                };
                Self::open_sqlite(db_path).await?
            }
        };

        Ok(PlanRegistry::new(store, self.config))
    }

    async fn open_sqlite(db_path: PathBuf) -> Result<SharedStore> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PlanError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        log::debug!("Opening task store at {}", db_path.display());
        let store = task::spawn_blocking(move || SqliteStore::open(&db_path))
            .await
            .map_err(|e| PlanError::Configuration {
                message: format!("Task join error: {e}"),
            })??;
        Ok(Arc::new(store))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("waypoint")
            .place_data_file("waypoint.db")
            .map_err(|e| PlanError::XdgDirectory(e.to_string()))
    }
}
