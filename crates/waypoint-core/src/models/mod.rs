//! Data models for plans and tasks.
//!
//! This module contains the core domain models of the scheduler. Display
//! implementations live in [`crate::display`] so the data structures stay free
//! of presentation logic.
//!
//! # Hierarchy
//!
//! A [`PlanRecord`] is the root of a tree of [`Task`]s. Top-level tasks carry
//! the plan id as their `parent_id`; subtasks point at their parent task.
//! Independently of the tree, a task may declare predecessors that must be
//! done before it becomes ready.
//!
//! Both roots and nodes implement [`Schedulable`], the capability the
//! scheduler needs to walk the hierarchy:
//!
//! ```rust
//! use waypoint_core::models::{PlanRecord, Schedulable, Task, TaskStatus};
//!
//! let record = PlanRecord::new("agent-1", "ship feature X");
//! let task = Task::new(&record.plan_id, "write the code")
//!     .with_parent(&record.plan_id)
//!     .with_status(TaskStatus::Ready);
//!
//! assert_eq!(task.parent_id(), Some(record.id()));
//! assert!(record.parent_id().is_none());
//! ```

pub mod filters;
pub mod ids;
pub mod plan;
pub mod status;
pub mod summary;
pub mod task;


pub use filters::{PlanFilter, TaskFilter};
pub use plan::{derive_plan_status, PlanRecord};
pub use status::{FailurePolicy, TaskStatus};
pub use summary::{PlanSummary, StatusCounts};
pub use task::{Task, DEFAULT_COMMAND};

/// Shared capability of everything that takes part in the task hierarchy.
pub trait Schedulable {
    /// Immutable identifier.
    fn id(&self) -> &str;

    /// Current lifecycle status.
    fn status(&self) -> TaskStatus;

    /// Owning task or plan, if any.
    fn parent_id(&self) -> Option<&str>;

    /// Tasks that must be done first.
    fn predecessor_ids(&self) -> &[String];
}
