//! Display formatting for models, collections and operation results.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and results get newtype wrappers so the same data can be
//! rendered differently per context. All output is markdown, rendered by the
//! CLI's terminal renderer.
//!
//! ```rust
//! use waypoint_core::{display::Tasks, models::Task};
//!
//! let tasks = Tasks(vec![Task::new("PL-1", "write the parser")]);
//! assert!(tasks.to_string().contains("### write the parser"));
//! ```

pub mod collections;
pub mod models;
pub mod results;

pub use collections::{PlanSummaries, Tasks};
pub use results::CreateResult;
