//! Plan summary types and functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{PlanRecord, TaskStatus};

/// Number of tasks per lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub backlog: u32,
    pub ready: u32,
    pub in_progress: u32,
    pub done: u32,
    pub failed: u32,
}

impl StatusCounts {
    /// Counts the given statuses.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = TaskStatus>,
    {
        let mut counts = Self::default();
        for status in statuses {
            counts.record(status);
        }
        counts
    }

    /// Adds one task with `status` to the tally.
    pub fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Backlog => self.backlog += 1,
            TaskStatus::Ready => self.ready += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Done => self.done += 1,
            TaskStatus::Failed => self.failed += 1,
        }
    }

    /// Total number of tasks counted.
    pub fn total(&self) -> u32 {
        self.backlog + self.ready + self.in_progress + self.done + self.failed
    }
}

/// Summary information about a plan with task statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Plan ID
    pub plan_id: String,
    /// Owning agent
    pub agent_id: String,
    /// The agent's goal sentence
    pub goal: String,
    /// Derived plan status
    pub status: TaskStatus,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp
    pub updated_at: Timestamp,
    /// Tasks per status
    pub counts: StatusCounts,
}

impl PlanSummary {
    /// Create a PlanSummary from a record and its task counts
    pub fn from_record(record: PlanRecord, counts: StatusCounts) -> Self {
        Self {
            plan_id: record.plan_id,
            agent_id: record.agent_id,
            goal: record.goal,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            counts,
        }
    }
}
