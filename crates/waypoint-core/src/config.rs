//! Tunables shared by every plan a registry creates.

use std::time::Duration;

use crate::models::FailurePolicy;

/// Number of tasks a plan keeps loaded before evicting clean ones.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Configuration applied to every [`Plan`](crate::plan::Plan).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanConfig {
    /// Soft bound on loaded tasks; dirty tasks are never evicted
    pub cache_capacity: usize,
    /// What happens to the dependents of a failed task
    pub failure_policy: FailurePolicy,
    /// Flush interval for plans that opt into autosave
    pub autosave_interval: Option<Duration>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            failure_policy: FailurePolicy::default(),
            autosave_interval: None,
        }
    }
}
