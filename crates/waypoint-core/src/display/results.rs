//! Operation result types for displaying the outcome of mutations.

use std::fmt;

use crate::{
    models::{PlanRecord, Task},
    plan::{SavePhase, SaveReport, TaskUpdate},
};

/// Wrapper type for displaying the result of create operations.
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    /// Create a new CreateResult wrapper.
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<PlanRecord> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created plan with ID: {}", self.resource.plan_id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created task with ID: {}", self.resource.task_id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for TaskUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status_changed() {
            writeln!(
                f,
                "Task {}: {} → {}",
                self.task.task_id,
                self.previous_status.with_icon(),
                self.task.status.with_icon()
            )?;
        } else {
            writeln!(f, "Task {} is unchanged", self.task.task_id)?;
        }

        if !self.promoted.is_empty() {
            writeln!(f)?;
            writeln!(f, "Now ready:")?;
            for id in &self.promoted {
                writeln!(f, "- `{id}`")?;
            }
        }
        if !self.failed.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed as dependents:")?;
            for id in &self.failed {
                writeln!(f, "- `{id}`")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for SaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.writes() == 0 && self.failures.is_empty() {
            return writeln!(f, "Nothing to save.");
        }

        writeln!(
            f,
            "Saved {} new and {} changed task(s).",
            self.created.len(),
            self.updated.len()
        )?;
        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Not saved (will be retried):")?;
            for failure in &self.failures {
                let phase = match failure.phase {
                    SavePhase::Update => "update",
                    SavePhase::Create => "create",
                };
                writeln!(f, "- `{}` ({phase}): {}", failure.task_id, failure.error)?;
            }
        }
        Ok(())
    }
}
