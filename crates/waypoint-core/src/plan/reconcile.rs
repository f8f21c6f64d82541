//! Writing dirty tasks and the plan record back to the store.

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use tokio::{task::JoinHandle, time};

use super::{readiness::mark_dirty, Plan};
use crate::{
    error::{PlanError, Result},
    store::run_blocking,
};

/// Which write of a save a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    Update,
    Create,
}

/// A task that could not be written. It stays dirty for the next save.
#[derive(Debug)]
pub struct SaveFailure {
    pub task_id: String,
    pub phase: SavePhase,
    pub error: PlanError,
}

/// What a call to [`Plan::save`] wrote.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Existing tasks updated in the store
    pub updated: Vec<String>,
    /// New tasks added to the store
    pub created: Vec<String>,
    /// Tasks whose write failed
    pub failures: Vec<SaveFailure>,
    /// Whether the plan record was written
    pub plan_record_written: bool,
}

impl SaveReport {
    /// True when every dirty task was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of store writes performed.
    pub fn writes(&self) -> usize {
        self.updated.len() + self.created.len() + usize::from(self.plan_record_written)
    }
}

impl Plan {
    /// Marks a known task for re-persisting on the next save.
    ///
    /// A task that was never saved, or is already marked, is left alone.
    pub async fn mark_modified(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.all.contains(id) {
            return Err(PlanError::TaskNotFound { id: id.to_string() });
        }
        if state.is_dirty(id) {
            return Ok(());
        }
        self.load(&mut state, id).await?;
        mark_dirty(&mut state, id);
        Ok(())
    }

    /// Writes every dirty task, then the plan record.
    ///
    /// Modified tasks are updated before new tasks are added. Each task
    /// written successfully leaves its dirty set; a task whose write fails
    /// stays dirty and is reported in [`SaveReport::failures`], so calling
    /// `save` again retries it. The plan record is written last and only
    /// when something affecting it changed; a failure there is returned as
    /// an error and retried by the next save.
    ///
    /// With nothing dirty, `save` performs no store writes at all.
    pub async fn save(&self) -> Result<SaveReport> {
        let mut state = self.state.lock().await;
        let mut report = SaveReport::default();

        let to_update: Vec<String> = state
            .modified
            .iter()
            .filter(|id| !state.new.contains(id))
            .map(String::from)
            .collect();
        for id in to_update {
            let Some(task) = state.cache.get(&id).cloned() else {
                report.failures.push(SaveFailure {
                    error: PlanError::invariant(format!("modified task {id} is not loaded")),
                    task_id: id,
                    phase: SavePhase::Update,
                });
                continue;
            };
            match run_blocking(&self.store, move |store| store.update_task(&task)).await {
                Ok(()) => report.updated.push(id),
                Err(error) => {
                    log::warn!("Failed to update task {id}: {error}");
                    report.failures.push(SaveFailure {
                        task_id: id,
                        phase: SavePhase::Update,
                        error,
                    });
                }
            }
        }

        let to_create = state.new.to_vec();
        for id in to_create {
            let Some(task) = state.cache.get(&id).cloned() else {
                report.failures.push(SaveFailure {
                    error: PlanError::invariant(format!("new task {id} is not loaded")),
                    task_id: id,
                    phase: SavePhase::Create,
                });
                continue;
            };
            match run_blocking(&self.store, move |store| store.add_task(&task)).await {
                Ok(()) => report.created.push(id),
                Err(error) => {
                    log::warn!("Failed to add task {id}: {error}");
                    report.failures.push(SaveFailure {
                        task_id: id,
                        phase: SavePhase::Create,
                        error,
                    });
                }
            }
        }

        for id in &report.updated {
            state.modified.remove(id);
        }
        for id in &report.created {
            state.new.remove(id);
            state.modified.remove(id);
        }

        if state.record_dirty {
            let mut record = state.snapshot_record();
            record.updated_at = Timestamp::now();
            let written = record.clone();
            run_blocking(&self.store, move |store| store.update_plan(&written)).await?;
            state.record = record;
            state.record_dirty = false;
            report.plan_record_written = true;
        }

        log::debug!(
            "Saved plan {}: {} updated, {} created, {} failed",
            self.plan_id,
            report.updated.len(),
            report.created.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Saves the plan every `every` until the returned handle is dropped.
    pub fn spawn_autosave(self: &Arc<Self>, every: Duration) -> AutosaveHandle {
        let plan = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match plan.save().await {
                    Ok(report) if !report.is_complete() => log::warn!(
                        "Autosave of plan {} left {} task(s) dirty",
                        plan.plan_id,
                        report.failures.len()
                    ),
                    Ok(_) => {}
                    Err(e) => log::warn!("Autosave of plan {} failed: {e}", plan.plan_id),
                }
            }
        });
        AutosaveHandle { handle }
    }
}

/// Stops the autosave loop when dropped.
#[derive(Debug)]
pub struct AutosaveHandle {
    handle: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Stops the loop now.
    pub fn stop(self) {}
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
