//! Collection wrapper types for displaying groups of domain objects.

use std::fmt;

use crate::models::{PlanSummary, Task};

/// Newtype wrapper for displaying plan summaries.
pub struct PlanSummaries(pub Vec<PlanSummary>);

impl PlanSummaries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for PlanSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans found.");
        }
        for plan in &self.0 {
            write!(f, "{plan}")?;
        }
        Ok(())
    }
}

impl From<Vec<PlanSummary>> for PlanSummaries {
    fn from(plans: Vec<PlanSummary>) -> Self {
        Self(plans)
    }
}

/// Newtype wrapper for displaying a list of tasks.
pub struct Tasks(pub Vec<Task>);

impl Tasks {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Tasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tasks found.");
        }
        for task in &self.0 {
            write!(f, "{task}")?;
        }
        Ok(())
    }
}

impl From<Vec<Task>> for Tasks {
    fn from(tasks: Vec<Task>) -> Self {
        Self(tasks)
    }
}
