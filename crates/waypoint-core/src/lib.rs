//! Core library of Waypoint, a task dependency graph and readiness scheduler
//! for autonomous agents.
//!
//! Every agent owns one [`Plan`]: a tree of tasks (subtasks hang off their
//! parent, top-level tasks off the plan) with predecessor edges across the
//! tree. The plan tracks which tasks are ready to run, promotes dependents as
//! their predecessors complete, and writes changes back to a
//! [`TaskStore`](store::TaskStore) in one reconciling [`Plan::save`].
//!
//! # Layers
//!
//! - [`models`]: tasks, plan records, statuses, filters
//! - [`store`]: the persistence boundary, with SQLite and in-memory adapters
//! - [`plan`]: readiness tracking, dirty-set reconciliation, pitches
//! - [`registry`]: one live plan per agent, constructed exactly once
//! - [`display`]: markdown formatting for the CLI
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use waypoint_core::{
//!     models::{Task, TaskStatus},
//!     params::ObtainPlan,
//!     store::MemoryStore,
//!     PlanRegistryBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = PlanRegistryBuilder::new()
//!     .with_store(Arc::new(MemoryStore::new()))
//!     .build()
//!     .await?;
//!
//! let plan = registry
//!     .obtain(&ObtainPlan::fresh("agent-1", "ship feature X"))
//!     .await?;
//!
//! let code = Task::new(plan.plan_id(), "write code").with_parent(plan.plan_id());
//! let tests = Task::new(plan.plan_id(), "write tests")
//!     .with_parent(plan.plan_id())
//!     .with_predecessors([code.task_id.clone()]);
//! let code_id = code.task_id.clone();
//! plan.register_tasks(vec![code, tests]).await?;
//!
//! let update = plan.set_status(&code_id, TaskStatus::Done).await?;
//! assert_eq!(update.promoted.len(), 1);
//!
//! let report = plan.save().await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod params;
pub mod plan;
pub mod registry;
pub mod store;

// Re-export commonly used types
pub use config::PlanConfig;
pub use display::{CreateResult, PlanSummaries, Tasks};
pub use error::{PlanError, Result};
pub use models::{
    FailurePolicy, PlanFilter, PlanRecord, PlanSummary, StatusCounts, Task, TaskFilter, TaskStatus,
};
pub use params::{ObtainPlan, TaskCreate};
pub use plan::{Pitch, Plan, SaveReport, TaskUpdate};
pub use registry::{PlanRegistry, PlanRegistryBuilder};
pub use store::{MemoryStore, SharedStore, SqliteStore, TaskStore};
