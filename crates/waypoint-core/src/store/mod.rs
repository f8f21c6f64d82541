//! Store adapters: the persistence boundary of the scheduler.
//!
//! A [`TaskStore`] is a narrow record table for tasks and plan records. The
//! scheduler never assumes exclusive access; plans of different agents share
//! one store and are kept apart only by filtering on `plan_id`/`agent_id`.
//! Per-key atomicity of `update_*` is the adapter's responsibility.
//!
//! Adapters are synchronous. [`Plan`](crate::plan::Plan) calls them through
//! [`run_blocking`], which moves each call onto tokio's blocking pool; these
//! calls are the only points where plan operations suspend.

use std::sync::Arc;

use tokio::task;

use crate::{
    error::{PlanError, Result},
    models::{PlanFilter, PlanRecord, Task, TaskFilter},
};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Record table for tasks and plan records.
///
/// Contracts:
/// - `list_*` returns every matching record (possibly none) in insertion
///   order;
/// - `get_*` fails with the matching NotFound error when absent;
/// - `add_*` fails with [`PlanError::Conflict`] when the id exists;
/// - `update_*` fails with NotFound when absent and replaces the full record.
///
/// Transient backend failures surface as [`PlanError::StoreUnavailable`].
pub trait TaskStore: Send + Sync {
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    fn get_task(&self, task_id: &str) -> Result<Task>;

    fn add_task(&self, task: &Task) -> Result<()>;

    fn update_task(&self, task: &Task) -> Result<()>;

    fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<PlanRecord>>;

    fn get_plan(&self, plan_id: &str) -> Result<PlanRecord>;

    fn add_plan(&self, record: &PlanRecord) -> Result<()>;

    fn update_plan(&self, record: &PlanRecord) -> Result<()>;
}

/// Shared handle to a store adapter.
pub type SharedStore = Arc<dyn TaskStore>;

/// Runs a store call on the blocking pool.
pub async fn run_blocking<T, F>(store: &SharedStore, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn TaskStore) -> Result<T> + Send + 'static,
{
    let store = Arc::clone(store);
    task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| PlanError::Configuration {
            message: format!("Task join error: {e}"),
        })?
}
