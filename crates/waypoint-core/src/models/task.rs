//! Task model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ids, Schedulable, TaskStatus};
use crate::params::TaskCreate;

/// Command assigned to the seed task of a fresh plan.
pub const DEFAULT_COMMAND: &str = "make_initial_plan";

/// Represents a single node in a plan's task hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier for the task (`TA` prefix)
    pub task_id: String,

    /// ID of the owning plan
    pub plan_id: String,

    /// ID of the parent task, or the plan id for top-level tasks
    pub parent_id: Option<String>,

    /// Tasks that must be done before this one may run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predecessor_ids: Vec<String>,

    /// Current lifecycle status
    pub status: TaskStatus,

    /// Agent assigned to execute the task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_agent_id: Option<String>,

    /// What the task should achieve
    pub goal: String,

    /// Longer explanation of the task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Command the executing agent should run
    pub command: String,

    /// Arguments for the command
    #[serde(default)]
    pub arguments: Map<String, Value>,

    /// Conditions under which the task counts as achieved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,

    /// What the executing agent reported back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Timestamp when the task was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the task was last modified (UTC)
    pub updated_at: Timestamp,
}

impl Task {
    /// Creates a backlog task with a fresh id and the default command.
    pub fn new(plan_id: impl Into<String>, goal: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            task_id: ids::generate_task_id(),
            plan_id: plan_id.into(),
            parent_id: None,
            predecessor_ids: Vec::new(),
            status: TaskStatus::Backlog,
            responsible_agent_id: None,
            goal: goal.into(),
            description: None,
            command: DEFAULT_COMMAND.to_string(),
            arguments: Map::new(),
            acceptance_criteria: Vec::new(),
            output: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds a task for `plan_id` from creation parameters. Top-level tasks
    /// (no explicit parent) hang directly off the plan.
    pub fn from_params(plan_id: &str, params: &TaskCreate) -> Self {
        let mut task = Self::new(plan_id, params.goal.clone());
        task.parent_id = Some(
            params
                .parent_id
                .clone()
                .unwrap_or_else(|| plan_id.to_string()),
        );
        task.predecessor_ids = dedup(&params.predecessor_ids);
        task.description = params.description.clone();
        if let Some(command) = &params.command {
            task.command = command.clone();
        }
        task.arguments = params.arguments.clone();
        task.acceptance_criteria = params.acceptance_criteria.clone();
        task.responsible_agent_id = params.responsible_agent_id.clone();
        task
    }

    /// Sets the parent reference.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Sets the predecessor set, dropping duplicates.
    pub fn with_predecessors<I, S>(mut self, predecessor_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = predecessor_ids.into_iter().map(Into::into).collect();
        self.predecessor_ids = dedup(&ids);
        self
    }

    /// Sets the initial status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the command.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

impl Schedulable for Task {
    fn id(&self) -> &str {
        &self.task_id
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn predecessor_ids(&self) -> &[String] {
        &self.predecessor_ids
    }
}

fn dedup(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}
