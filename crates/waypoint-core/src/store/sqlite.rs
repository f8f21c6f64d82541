//! Durable SQLite store adapter.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use super::TaskStore;
use crate::{
    db::Database,
    error::{PlanError, Result},
    models::{PlanFilter, PlanRecord, Task, TaskFilter},
};

/// [`TaskStore`] backed by a SQLite file.
///
/// One connection is opened up front and shared behind a mutex; calls from
/// different plans are serialised on it.
pub struct SqliteStore {
    db_path: PathBuf,
    db: Mutex<Database>,
}

impl SqliteStore {
    /// Opens (and if needed initializes) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let db = Database::new(&db_path)?;
        Ok(Self {
            db_path,
            db: Mutex::new(db),
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| {
            PlanError::store_unavailable("SQLite connection lock poisoned")
                .with_source("poisoned mutex")
        })
    }
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl TaskStore for SqliteStore {
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.db()?.list_tasks(filter)
    }

    fn get_task(&self, task_id: &str) -> Result<Task> {
        self.db()?
            .get_task(task_id)?
            .ok_or_else(|| PlanError::TaskNotFound {
                id: task_id.to_string(),
            })
    }

    fn add_task(&self, task: &Task) -> Result<()> {
        self.db()?.insert_task(task)
    }

    fn update_task(&self, task: &Task) -> Result<()> {
        self.db()?.update_task(task)
    }

    fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<PlanRecord>> {
        self.db()?.list_plans(filter)
    }

    fn get_plan(&self, plan_id: &str) -> Result<PlanRecord> {
        self.db()?
            .get_plan(plan_id)?
            .ok_or_else(|| PlanError::PlanNotFound {
                id: plan_id.to_string(),
            })
    }

    fn add_plan(&self, record: &PlanRecord) -> Result<()> {
        self.db()?.insert_plan(record)
    }

    fn update_plan(&self, record: &PlanRecord) -> Result<()> {
        self.db()?.update_plan(record)
    }
}
