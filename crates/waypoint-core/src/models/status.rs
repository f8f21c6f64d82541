//! Lifecycle status of tasks and plans.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of task statuses.
///
/// The lifecycle is `Backlog -> Ready -> InProgress -> {Done, Failed}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for at least one predecessor to reach `Done`
    #[default]
    Backlog,

    /// Every predecessor is done; eligible to run
    Ready,

    /// Claimed by the executing agent
    InProgress,

    /// Completed successfully
    Done,

    /// Completed unsuccessfully
    Failed,
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "backlog" => Ok(TaskStatus::Backlog),
            "ready" => Ok(TaskStatus::Ready),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl TaskStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Backlog,
        TaskStatus::Ready,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Failed,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::Ready => "ready",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use waypoint_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Done.with_icon(), "✓ Done");
    /// assert_eq!(TaskStatus::Ready.with_icon(), "▶ Ready");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "○ Backlog",
            TaskStatus::Ready => "▶ Ready",
            TaskStatus::InProgress => "➤ In Progress",
            TaskStatus::Done => "✓ Done",
            TaskStatus::Failed => "✗ Failed",
        }
    }

    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// Writing the current status again is not a transition and returns
    /// false; callers treat it as a no-op before asking.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;

        matches!(
            (self, next),
            (Backlog, Ready)
                | (Backlog, Failed)
                | (Ready, InProgress)
                | (Ready, Done)
                | (Ready, Failed)
                | (InProgress, Done)
                | (InProgress, Failed)
        )
    }
}

/// What happens to the dependents of a task that fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Dependents stay in the backlog until the caller intervenes
    #[default]
    KeepBacklog,

    /// Backlog dependents are failed transitively
    FailDependents,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "keep_backlog" => Ok(FailurePolicy::KeepBacklog),
            "fail_dependents" => Ok(FailurePolicy::FailDependents),
            _ => Err(format!("Invalid failure policy: {s}")),
        }
    }
}
