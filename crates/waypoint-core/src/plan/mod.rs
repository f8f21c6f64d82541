//! The per-agent plan: a task graph with readiness tracking and dirty-set
//! reconciliation against a [`TaskStore`](crate::store::TaskStore).
//!
//! A [`Plan`] owns the full id list of its tasks and a readiness index
//! (status, parent and predecessors of every task), while task payloads are
//! loaded lazily into a bounded cache. Mutations only touch memory and mark
//! tasks dirty; [`Plan::save`] writes them back.
//!
//! All state sits behind one async mutex, so operations on a plan are
//! serialized. They suspend only on store I/O.

mod bootstrap;
mod cache;
mod index;
mod pitch;
mod readiness;
mod reconcile;

#[cfg(test)]
mod tests;

use tokio::sync::{Mutex, MutexGuard};

pub use index::OrderedIdSet;
pub use pitch::{Pitch, PitchEntry};
pub use readiness::TaskUpdate;
pub use reconcile::{AutosaveHandle, SaveFailure, SavePhase, SaveReport};

use self::{
    cache::TaskCache,
    index::{ReadinessIndex, TaskNode},
};
use crate::{
    config::PlanConfig,
    error::{PlanError, Result},
    models::{derive_plan_status, PlanRecord, StatusCounts, Task, TaskStatus},
    store::{run_blocking, SharedStore},
};

/// A live plan of one agent.
pub struct Plan {
    plan_id: String,
    agent_id: String,
    store: SharedStore,
    config: PlanConfig,
    state: Mutex<PlanState>,
}

pub(crate) struct PlanState {
    record: PlanRecord,
    all: OrderedIdSet,
    ready: OrderedIdSet,
    modified: OrderedIdSet,
    new: OrderedIdSet,
    index: ReadinessIndex,
    cache: TaskCache,
    record_dirty: bool,
}

impl PlanState {
    fn new(record: PlanRecord, cache_capacity: usize) -> Self {
        Self {
            record,
            all: OrderedIdSet::new(),
            ready: OrderedIdSet::new(),
            modified: OrderedIdSet::new(),
            new: OrderedIdSet::new(),
            index: ReadinessIndex::default(),
            cache: TaskCache::new(cache_capacity),
            record_dirty: false,
        }
    }

    fn is_dirty(&self, id: &str) -> bool {
        self.new.contains(id) || self.modified.contains(id)
    }

    /// Caches `task`, never evicting dirty entries.
    fn cache_task(&mut self, task: Task) {
        let Self {
            cache, new, modified, ..
        } = self;
        cache.insert(task, |id| new.contains(id) || modified.contains(id));
    }

    /// Adds a task to the id lists and the index.
    fn track(&mut self, task: &Task) {
        self.all.insert(&task.task_id);
        self.index.insert(&task.task_id, TaskNode::of(task));
        if task.status == TaskStatus::Ready {
            self.ready.insert(&task.task_id);
        }
    }

    fn counts(&self) -> StatusCounts {
        StatusCounts::from_statuses(self.all.iter().filter_map(|id| self.index.status(id)))
    }

    /// Plan record reflecting the in-memory state.
    fn snapshot_record(&self) -> PlanRecord {
        let mut record = self.record.clone();
        record.task_ids = self.all.to_vec();
        record.ready_task_ids = self.ready.to_vec();
        record.status = derive_plan_status(&self.counts());
        record
    }
}

impl Plan {
    fn with_record(store: SharedStore, config: PlanConfig, record: PlanRecord) -> Self {
        Self {
            plan_id: record.plan_id.clone(),
            agent_id: record.agent_id.clone(),
            store,
            state: Mutex::new(PlanState::new(record, config.cache_capacity)),
            config,
        }
    }

    /// The plan id (`PL` prefix).
    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    /// The owning agent.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// The agent's goal sentence.
    pub async fn goal(&self) -> String {
        self.state.lock().await.record.goal.clone()
    }

    /// The plan record as it would be written by the next save.
    pub async fn record(&self) -> PlanRecord {
        self.state.lock().await.snapshot_record()
    }

    /// Ensures `id` is loaded into the cache.
    ///
    /// Fails with `TaskNotFound` for ids the plan does not know, without
    /// touching the store.
    async fn load(&self, state: &mut MutexGuard<'_, PlanState>, id: &str) -> Result<()> {
        if state.cache.contains(id) {
            return Ok(());
        }
        let task = self.fetch(state, id).await?;
        state.cache_task(task);
        Ok(())
    }

    /// Returns a copy of `id` from the cache or the store, leaving the
    /// cache untouched.
    async fn fetch(&self, state: &mut MutexGuard<'_, PlanState>, id: &str) -> Result<Task> {
        if !state.all.contains(id) {
            return Err(PlanError::TaskNotFound { id: id.to_string() });
        }
        if let Some(task) = state.cache.get(id) {
            return Ok(task.clone());
        }

        let task_id = id.to_string();
        let task = run_blocking(&self.store, move |store| store.get_task(&task_id)).await?;
        if task.task_id != id || task.plan_id != self.plan_id {
            return Err(PlanError::invariant(format!(
                "store returned task {} of plan {} for {id}",
                task.task_id, task.plan_id
            )));
        }
        log::debug!("Loaded task {id} of plan {}", self.plan_id);
        Ok(task)
    }

    /// Loads `id` and returns a copy of it.
    async fn load_cloned(&self, state: &mut MutexGuard<'_, PlanState>, id: &str) -> Result<Task> {
        self.load(state, id).await?;
        state
            .cache
            .get(id)
            .cloned()
            .ok_or_else(|| PlanError::TaskNotFound { id: id.to_string() })
    }
}

impl std::fmt::Debug for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plan")
            .field("plan_id", &self.plan_id)
            .field("agent_id", &self.agent_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
