//! Equality filters for store listings.

use super::{Task, TaskStatus};

/// Equality filter for listing tasks. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks belonging to this plan
    pub plan_id: Option<String>,

    /// Only direct children of this task or plan
    pub parent_id: Option<String>,

    /// Only tasks in this status
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Filter matching every task of a plan.
    pub fn for_plan(plan_id: impl Into<String>) -> Self {
        Self {
            plan_id: Some(plan_id.into()),
            ..Default::default()
        }
    }

    /// Restricts the filter to one status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the filter to direct children of `parent_id`.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Whether `task` satisfies every set field.
    pub fn matches(&self, task: &Task) -> bool {
        self.plan_id
            .as_ref()
            .map_or(true, |plan_id| &task.plan_id == plan_id)
            && self
                .parent_id
                .as_ref()
                .map_or(true, |parent| task.parent_id.as_ref() == Some(parent))
            && self.status.map_or(true, |status| task.status == status)
    }
}

/// Equality filter for listing plan records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanFilter {
    /// Only plans owned by this agent
    pub agent_id: Option<String>,
}

impl PlanFilter {
    /// Filter matching every plan of an agent.
    pub fn for_agent(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
        }
    }
}
