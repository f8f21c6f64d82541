//! Plan record definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ids, Schedulable, StatusCounts, TaskStatus};

/// Persisted root of a plan's task hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanRecord {
    /// Unique identifier for the plan (`PL` prefix)
    pub plan_id: String,

    /// Agent owning the plan
    pub agent_id: String,

    /// The agent's goal sentence
    pub goal: String,

    /// Status derived from the plan's tasks
    #[serde(default)]
    pub status: TaskStatus,

    /// Every task id known to belong to the plan, in registration order
    #[serde(default)]
    pub task_ids: Vec<String>,

    /// Snapshot of the ready set at the last save
    #[serde(default)]
    pub ready_task_ids: Vec<String>,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan record was last written (UTC)
    pub updated_at: Timestamp,
}

impl PlanRecord {
    /// Creates an empty record with a fresh plan id.
    pub fn new(agent_id: impl Into<String>, goal: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            plan_id: ids::generate_plan_id(),
            agent_id: agent_id.into(),
            goal: goal.into(),
            status: TaskStatus::Ready,
            task_ids: Vec::new(),
            ready_task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Schedulable for PlanRecord {
    fn id(&self) -> &str {
        &self.plan_id
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn parent_id(&self) -> Option<&str> {
        None
    }

    fn predecessor_ids(&self) -> &[String] {
        &[]
    }
}

/// Derives a plan's status from the statuses of its tasks.
///
/// - no tasks, or nothing started yet: `Ready`
/// - every task done: `Done`
/// - nothing runnable or running and at least one failure: `Failed`
/// - otherwise: `InProgress`
pub fn derive_plan_status(counts: &StatusCounts) -> TaskStatus {
    let total = counts.total();
    if total == 0 {
        return TaskStatus::Ready;
    }
    if counts.done == total {
        return TaskStatus::Done;
    }
    if counts.failed > 0 && counts.ready == 0 && counts.in_progress == 0 {
        return TaskStatus::Failed;
    }
    if counts.done == 0 && counts.failed == 0 && counts.in_progress == 0 {
        return TaskStatus::Ready;
    }
    TaskStatus::InProgress
}
