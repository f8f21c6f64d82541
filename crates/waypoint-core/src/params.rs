//! Parameter structures for scheduler operations
//!
//! These structures carry operation inputs across interfaces (library callers,
//! the CLI) without framework-specific derives. Interface layers define their
//! own argument types and convert into these via `From`.
//!
//! ```ignore
//! // In the CLI crate
//! #[derive(Args)]
//! pub struct AddTaskArgs {
//!     pub goal: String,
//!     #[arg(long)]
//!     pub parent: Option<String>,
//! }
//!
//! impl From<AddTaskArgs> for TaskCreate {
//!     fn from(val: AddTaskArgs) -> Self {
//!         TaskCreate {
//!             goal: val.goal,
//!             parent_id: val.parent,
//!             ..Default::default()
//!         }
//!     }
//! }
//! ```

use serde_json::{Map, Value};

/// Parameters for obtaining the plan of an agent.
///
/// `plan_id` selects the resume path; without it a fresh plan seeded with
/// `goal` is created. Both fields are ignored when the agent already has a
/// live plan.
#[derive(Debug, Clone, Default)]
pub struct ObtainPlan {
    /// Agent owning the plan
    pub agent_id: String,
    /// Existing plan to resume
    pub plan_id: Option<String>,
    /// Goal sentence used to seed a fresh plan
    pub goal: String,
}

impl ObtainPlan {
    /// Parameters for a fresh plan.
    pub fn fresh(agent_id: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            plan_id: None,
            goal: goal.into(),
        }
    }

    /// Parameters for resuming a stored plan.
    pub fn resume(agent_id: impl Into<String>, plan_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            plan_id: Some(plan_id.into()),
            goal: String::new(),
        }
    }
}

/// Parameters for creating a task.
#[derive(Debug, Clone, Default)]
pub struct TaskCreate {
    /// What the task should achieve
    pub goal: String,
    /// Optional longer explanation
    pub description: Option<String>,
    /// Command to run; the default command when absent
    pub command: Option<String>,
    /// Arguments for the command
    pub arguments: Map<String, Value>,
    /// Completion conditions
    pub acceptance_criteria: Vec<String>,
    /// Parent task; the plan itself when absent
    pub parent_id: Option<String>,
    /// Tasks that must be done first
    pub predecessor_ids: Vec<String>,
    /// Agent assigned to execute the task
    pub responsible_agent_id: Option<String>,
}
