//! Registration, status transitions and readiness queries.

use std::collections::HashSet;

use tokio::sync::MutexGuard;

use super::{index::TaskNode, Plan, PlanState};
use crate::{
    error::{PlanError, Result},
    models::{FailurePolicy, StatusCounts, Task, TaskStatus},
};

/// Outcome of a task mutation.
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    /// The task after the mutation
    pub task: Task,
    /// Status before the mutation
    pub previous_status: TaskStatus,
    /// Dependents that became ready as a consequence
    pub promoted: Vec<String>,
    /// Dependents failed by the failure policy
    pub failed: Vec<String>,
}

impl TaskUpdate {
    /// Whether the mutation changed the task's status.
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.task.status
    }
}

impl Plan {
    /// Registers a batch of tasks with the plan.
    ///
    /// Ids the plan already knows are skipped, so registering the same batch
    /// twice is harmless. The batch is validated as a whole before anything
    /// is recorded: a task of another plan, a self-dependency, an unknown
    /// predecessor or parent, or a dependency cycle rejects the entire batch
    /// with [`PlanError::InvariantViolation`].
    ///
    /// Statuses are normalized against the predecessors: a `Ready` task with
    /// an unfinished predecessor is demoted to `Backlog`, a `Backlog` task
    /// whose predecessors are all done is promoted to `Ready`.
    ///
    /// Returns the ids that were actually registered.
    pub async fn register_tasks(&self, tasks: Vec<Task>) -> Result<Vec<String>> {
        let mut state = self.state.lock().await;
        register_locked(&mut state, &self.plan_id, tasks)
    }

    /// Registers a single task. See [`Plan::register_tasks`].
    pub async fn register_task(&self, task: Task) -> Result<String> {
        let id = task.task_id.clone();
        self.register_tasks(vec![task]).await?;
        Ok(id)
    }

    /// Returns a copy of the task, loading it from the store if needed.
    pub async fn get_task(&self, id: &str) -> Result<Task> {
        let mut state = self.state.lock().await;
        self.load_cloned(&mut state, id).await
    }

    /// Ready tasks in the order they became ready.
    pub async fn get_ready_tasks(&self) -> Result<Vec<Task>> {
        let mut state = self.state.lock().await;
        let ids = state.ready.to_vec();
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            tasks.push(self.load_cloned(&mut state, &id).await?);
        }
        Ok(tasks)
    }

    /// The oldest ready task, if any.
    pub async fn get_first_ready_task(&self) -> Result<Option<Task>> {
        let mut state = self.state.lock().await;
        let Some(id) = state.ready.first().map(String::from) else {
            return Ok(None);
        };
        self.load_cloned(&mut state, &id).await.map(Some)
    }

    /// Moves a task to `status` and propagates readiness.
    ///
    /// Setting the current status again is a no-op. Completing a task
    /// promotes every backlog dependent whose predecessors are now all done.
    /// Failing a task leaves its dependents in the backlog, or fails them
    /// transitively under [`FailurePolicy::FailDependents`].
    pub async fn set_status(&self, id: &str, status: TaskStatus) -> Result<TaskUpdate> {
        self.update_task(id, |task| task.status = status).await
    }

    /// Applies `mutate` to a copy of the task and stores the result.
    ///
    /// Identity and structure (`task_id`, `plan_id`, `parent_id`,
    /// `predecessor_ids`) are fixed after registration; changing them fails
    /// with [`PlanError::InvariantViolation`]. A status change goes through
    /// the same rules as [`Plan::set_status`] and is validated before
    /// anything is written.
    pub async fn update_task<F>(&self, id: &str, mutate: F) -> Result<TaskUpdate>
    where
        F: FnOnce(&mut Task),
    {
        let mut state = self.state.lock().await;
        let current = self.load_cloned(&mut state, id).await?;

        let mut draft = current.clone();
        mutate(&mut draft);
        check_structure(&current, &draft)?;

        let target = draft.status;
        let from = current.status;
        if target != from {
            check_transition(&state, &current, target)?;
        }

        let content_changed = {
            let mut compared = draft.clone();
            compared.updated_at = current.updated_at;
            compared != current
        };
        if !content_changed {
            return Ok(TaskUpdate {
                task: current,
                previous_status: from,
                promoted: Vec::new(),
                failed: Vec::new(),
            });
        }

        // Dependents are read before anything changes, so a failed load
        // leaves the plan as it was.
        let cascade = if target == from {
            Vec::new()
        } else {
            self.fetch_cascade(&mut state, id, target).await?
        };

        draft.touch();
        mark_dirty(&mut state, id);
        state.cache_task(draft);

        let mut promoted = Vec::new();
        let mut failed = Vec::new();
        if target != from {
            apply_status(&mut state, id, target);
            log::debug!("Task {id}: {from} -> {target}");

            for mut dependent in cascade {
                let dependent_id = dependent.task_id.clone();
                let status = if target == TaskStatus::Done {
                    log::debug!("Task {dependent_id} is ready after {id}");
                    promoted.push(dependent_id.clone());
                    TaskStatus::Ready
                } else {
                    failed.push(dependent_id.clone());
                    TaskStatus::Failed
                };
                dependent.status = status;
                dependent.touch();
                mark_dirty(&mut state, &dependent_id);
                state.cache_task(dependent);
                apply_status(&mut state, &dependent_id, status);
            }
            if !failed.is_empty() {
                log::info!("Failed {} dependents of task {id}", failed.len());
            }
        }

        let task = self.load_cloned(&mut state, id).await?;
        Ok(TaskUpdate {
            task,
            previous_status: from,
            promoted,
            failed,
        })
    }

    /// Every known task id, in registration order.
    pub async fn all_task_ids(&self) -> Vec<String> {
        self.state.lock().await.all.to_vec()
    }

    /// Ready task ids, oldest first.
    pub async fn ready_task_ids(&self) -> Vec<String> {
        self.state.lock().await.ready.to_vec()
    }

    /// Known tasks changed since the last save.
    pub async fn modified_task_ids(&self) -> Vec<String> {
        self.state.lock().await.modified.to_vec()
    }

    /// Tasks registered since the last save.
    pub async fn new_task_ids(&self) -> Vec<String> {
        self.state.lock().await.new.to_vec()
    }

    /// Whether the task's payload is currently held in memory.
    pub async fn is_loaded(&self, id: &str) -> bool {
        self.state.lock().await.cache.contains(id)
    }

    /// Current status of a task without loading its payload.
    pub async fn status_of(&self, id: &str) -> Result<TaskStatus> {
        self.state
            .lock()
            .await
            .index
            .status(id)
            .ok_or_else(|| PlanError::TaskNotFound { id: id.to_string() })
    }

    /// Number of tasks per status.
    pub async fn status_counts(&self) -> StatusCounts {
        self.state.lock().await.counts()
    }

    /// Dependents whose status follows from moving `id` to `target`:
    /// unblocked backlog tasks on completion, the backlog closure on failure
    /// under [`FailurePolicy::FailDependents`].
    async fn fetch_cascade(
        &self,
        state: &mut MutexGuard<'_, PlanState>,
        id: &str,
        target: TaskStatus,
    ) -> Result<Vec<Task>> {
        let ids = match target {
            TaskStatus::Done => state.index.promotable_dependents(id),
            TaskStatus::Failed if self.config.failure_policy == FailurePolicy::FailDependents => {
                state.index.backlog_dependents_closure(id)
            }
            _ => return Ok(Vec::new()),
        };

        let mut tasks = Vec::with_capacity(ids.len());
        for dependent in &ids {
            tasks.push(self.fetch(state, dependent).await?);
        }
        Ok(tasks)
    }
}

pub(super) fn register_locked(
    state: &mut PlanState,
    plan_id: &str,
    tasks: Vec<Task>,
) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let batch: Vec<Task> = tasks
        .into_iter()
        .filter(|task| !state.all.contains(&task.task_id))
        .filter(|task| seen.insert(task.task_id.clone()))
        .collect();
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    state.index.validate_batch(plan_id, &batch)?;

    for task in &batch {
        state.index.insert(&task.task_id, TaskNode::of(task));
    }

    let mut registered = Vec::with_capacity(batch.len());
    for mut task in batch {
        let unblocked = state.index.predecessors_done(&task.task_id);
        match task.status {
            TaskStatus::Ready if !unblocked => {
                log::debug!("Task {} waits on predecessors; keeping it in backlog", task.task_id);
                task.status = TaskStatus::Backlog;
            }
            TaskStatus::Backlog if unblocked => task.status = TaskStatus::Ready,
            _ => {}
        }

        registered.push(task.task_id.clone());
        state.new.insert(&task.task_id);
        state.track(&task);
        state.cache_task(task);
    }

    state.record_dirty = true;
    log::info!("Registered {} task(s) with plan {plan_id}", registered.len());
    Ok(registered)
}

/// Records a status in the index and the ready list.
pub(super) fn apply_status(state: &mut PlanState, id: &str, status: TaskStatus) {
    state.index.set_status(id, status);
    if status == TaskStatus::Ready {
        state.ready.insert(id);
    } else {
        state.ready.remove(id);
    }
    state.record_dirty = true;
}

/// Marks a known task as needing an update on the next save. Tasks not yet
/// saved are already covered by the new set.
pub(super) fn mark_dirty(state: &mut PlanState, id: &str) {
    if !state.is_dirty(id) {
        state.modified.insert(id);
    }
}

fn check_structure(current: &Task, draft: &Task) -> Result<()> {
    let field = if draft.task_id != current.task_id {
        "task_id"
    } else if draft.plan_id != current.plan_id {
        "plan_id"
    } else if draft.parent_id != current.parent_id {
        "parent_id"
    } else if draft.predecessor_ids != current.predecessor_ids {
        "predecessor_ids"
    } else {
        return Ok(());
    };
    Err(PlanError::invariant(format!(
        "{field} of task {} cannot change after registration",
        current.task_id
    )))
}

fn check_transition(state: &PlanState, task: &Task, to: TaskStatus) -> Result<()> {
    let from = task.status;
    let blocked = to == TaskStatus::Ready && !state.index.predecessors_done(&task.task_id);
    if !from.can_transition_to(to) || blocked {
        return Err(PlanError::InvalidTransition {
            id: task.task_id.clone(),
            from,
            to,
        });
    }
    Ok(())
}
