//! Creating and resuming plans.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map};

use super::{
    index::TaskNode,
    readiness::{apply_status, mark_dirty, register_locked},
    Plan, PlanState,
};
use crate::{
    config::PlanConfig,
    error::{PlanError, Result},
    models::{PlanRecord, Task, TaskFilter, TaskStatus, DEFAULT_COMMAND},
    store::{run_blocking, SharedStore},
};

/// Acceptance criterion of the seed task.
pub const SEED_ACCEPTANCE_CRITERION: &str = "A plan has been made to achieve the specific task";

/// Length hint passed to the planning command of the seed task.
const SEED_NOTE_LENGTH: u64 = 400;

impl Plan {
    /// Creates a fresh plan for `agent_id`, seeded with a single ready task
    /// asking for a plan to achieve `goal`, and stores the plan record.
    ///
    /// The seed task itself is new until the first save.
    pub(crate) async fn create(
        store: SharedStore,
        config: PlanConfig,
        agent_id: &str,
        goal: &str,
    ) -> Result<Self> {
        let record = PlanRecord::new(agent_id, goal);
        let plan = Self::with_record(store, config, record);

        {
            let mut state = plan.state.lock().await;
            register_locked(&mut state, &plan.plan_id, vec![seed_task(&plan.plan_id, goal)])?;

            let record = state.snapshot_record();
            let written = record.clone();
            run_blocking(&plan.store, move |store| store.add_plan(&written)).await?;
            state.record = record;
            state.record_dirty = false;
        }

        log::info!("Created plan {} for agent {agent_id}", plan.plan_id);
        Ok(plan)
    }

    /// Rebuilds a stored plan.
    ///
    /// Every task of the plan is indexed but none is cached. Task order
    /// follows the record's id list, followed by stored tasks the record
    /// does not mention; ready order follows the record's ready snapshot.
    /// Backlog tasks whose predecessors are all done are promoted and marked
    /// modified.
    pub(crate) async fn resume(
        store: SharedStore,
        config: PlanConfig,
        agent_id: &str,
        plan_id: &str,
    ) -> Result<Self> {
        let id = plan_id.to_string();
        let record = run_blocking(&store, move |store| store.get_plan(&id)).await?;
        if record.agent_id != agent_id {
            return Err(PlanError::invariant(format!(
                "plan {plan_id} belongs to agent {}, not {agent_id}",
                record.agent_id
            )));
        }

        let filter = TaskFilter::for_plan(plan_id);
        let tasks = run_blocking(&store, move |store| store.list_tasks(&filter)).await?;

        let plan = Self::with_record(store, config, record);
        {
            let mut state = plan.state.lock().await;
            rebuild(&mut state, tasks);

            let promotable: Vec<String> = state
                .all
                .iter()
                .filter(|id| state.index.status(id) == Some(TaskStatus::Backlog))
                .filter(|id| state.index.predecessors_done(id))
                .map(String::from)
                .collect();
            for id in &promotable {
                plan.load(&mut state, id).await?;
                if let Some(task) = state.cache.get_mut(id) {
                    task.status = TaskStatus::Ready;
                    task.touch();
                }
                mark_dirty(&mut state, id);
                apply_status(&mut state, id, TaskStatus::Ready);
            }
            if !promotable.is_empty() {
                log::info!(
                    "Promoted {} unblocked task(s) while resuming plan {plan_id}",
                    promotable.len()
                );
            }

            let snapshot = state.snapshot_record();
            if snapshot.task_ids != state.record.task_ids
                || snapshot.ready_task_ids != state.record.ready_task_ids
                || snapshot.status != state.record.status
            {
                state.record_dirty = true;
            }
        }

        log::info!("Resumed plan {plan_id} for agent {agent_id}");
        Ok(plan)
    }
}

/// Indexes stored tasks in record order.
fn rebuild(state: &mut PlanState, tasks: Vec<Task>) {
    let mut by_id: HashMap<String, Task> = HashMap::with_capacity(tasks.len());
    let mut store_order = Vec::with_capacity(tasks.len());
    for task in tasks {
        store_order.push(task.task_id.clone());
        by_id.insert(task.task_id.clone(), task);
    }

    let mut ordered: Vec<String> = Vec::with_capacity(by_id.len());
    let mut placed = HashSet::new();
    for id in &state.record.task_ids {
        if !by_id.contains_key(id) {
            log::warn!(
                "Plan {} lists task {id}, which is not in the store",
                state.record.plan_id
            );
            continue;
        }
        if placed.insert(id.clone()) {
            ordered.push(id.clone());
        }
    }
    for id in store_order {
        if placed.insert(id.clone()) {
            ordered.push(id);
        }
    }

    let ready_hint = state.record.ready_task_ids.clone();
    for id in &ordered {
        if let Some(task) = by_id.get(id) {
            state.all.insert(id);
            state.index.insert(id, TaskNode::of(task));
        }
    }
    for id in ready_hint.iter().chain(ordered.iter()) {
        if state.index.status(id) == Some(TaskStatus::Ready) {
            state.ready.insert(id);
        }
    }

    for id in state.all.iter() {
        let dangling: Vec<&String> = state
            .index
            .get(id)
            .map(|node| node.predecessor_ids.iter().filter(|p| !state.all.contains(p)).collect())
            .unwrap_or_default();
        for predecessor in dangling {
            log::warn!("Task {id} depends on unknown task {predecessor}; it cannot become ready");
        }
    }
}

fn seed_task(plan_id: &str, goal: &str) -> Task {
    let mut arguments = Map::new();
    arguments.insert("note_to_agent_length".to_string(), json!(SEED_NOTE_LENGTH));

    let mut task = Task::new(plan_id, goal)
        .with_parent(plan_id)
        .with_status(TaskStatus::Ready)
        .with_command(DEFAULT_COMMAND);
    task.arguments = arguments;
    task.acceptance_criteria = vec![SEED_ACCEPTANCE_CRITERION.to_string()];
    task
}
