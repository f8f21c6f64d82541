//! Display implementations for domain models.
//!
//! Everything renders as markdown so the CLI can hand it straight to the
//! terminal renderer.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

use crate::{
    models::{FailurePolicy, PlanRecord, PlanSummary, StatusCounts, Task, TaskStatus},
    plan::Pitch,
};

/// Formats a timestamp in the system time zone.
pub(crate) struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let zoned = self.0.to_zoned(TimeZone::system());
        write!(f, "{}", zoned.strftime("%Y-%m-%d %H:%M:%S %Z"))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::KeepBacklog => f.write_str("keep-backlog"),
            FailurePolicy::FailDependents => f.write_str("fail-dependents"),
        }
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} done, {} in progress, {} ready, {} backlog, {} failed",
            self.done, self.in_progress, self.ready, self.backlog, self.failed
        )
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {} ({})", self.goal, self.status.with_icon())?;
        writeln!(f)?;
        writeln!(f, "- ID: `{}`", self.task_id)?;
        if let Some(parent) = &self.parent_id {
            writeln!(f, "- Parent: `{parent}`")?;
        }
        if !self.predecessor_ids.is_empty() {
            let predecessors: Vec<String> =
                self.predecessor_ids.iter().map(|id| format!("`{id}`")).collect();
            writeln!(f, "- After: {}", predecessors.join(", "))?;
        }
        writeln!(f, "- Command: `{}`", self.command)?;
        if !self.arguments.is_empty() {
            let arguments = serde_json::Value::Object(self.arguments.clone());
            writeln!(f, "- Arguments: `{arguments}`")?;
        }
        if let Some(agent) = &self.responsible_agent_id {
            writeln!(f, "- Assigned to: {agent}")?;
        }
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;
        writeln!(f)?;

        if let Some(desc) = &self.description {
            writeln!(f, "{desc}")?;
            writeln!(f)?;
        }

        if !self.acceptance_criteria.is_empty() {
            writeln!(f, "#### Acceptance")?;
            writeln!(f)?;
            for criterion in &self.acceptance_criteria {
                writeln!(f, "- {criterion}")?;
            }
            writeln!(f)?;
        }

        if let Some(output) = &self.output {
            writeln!(f, "#### Output")?;
            writeln!(f)?;
            writeln!(f, "{output}")?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for PlanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.goal)?;
        writeln!(f)?;
        writeln!(f, "- ID: `{}`", self.plan_id)?;
        writeln!(f, "- Agent: {}", self.agent_id)?;
        writeln!(f, "- Status: {}", self.status.with_icon())?;
        writeln!(f, "- Tasks: {} ({} ready)", self.task_ids.len(), self.ready_task_ids.len())?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.counts.total();
        let progress = if total > 0 {
            format!(" ({}/{total})", self.counts.done)
        } else {
            String::new()
        };

        writeln!(f, "## {} (ID: {}){progress}", self.goal, self.plan_id)?;
        writeln!(f)?;
        writeln!(f, "- **Agent**: {}", self.agent_id)?;
        writeln!(f, "- **Status**: {}", self.status.with_icon())?;
        if total > 0 {
            writeln!(f, "- **Tasks**: {}", self.counts)?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Instruction")?;
        writeln!(f)?;
        writeln!(
            f,
            "Your goal is to find the best-suited command in order to achieve the following task: {}",
            self.task_description.as_deref().unwrap_or(&self.task_goal)
        )?;
        writeln!(f)?;
        writeln!(f, "# Context")?;
        writeln!(f)?;
        writeln!(
            f,
            "The high-level plan designed to achieve our goal ({}) is:",
            self.plan_goal
        )?;
        writeln!(f)?;
        for entry in &self.high_level_plan {
            match &entry.description {
                Some(desc) => writeln!(f, "- {}: {desc}", entry.goal)?,
                None => writeln!(f, "- {}", entry.goal)?,
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "We are working on the task \"{}\" that consists in: `{}`. This task is located in:",
            self.task_goal, self.task_command
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.path.join(" → "))?;

        if !self.sibling_ids.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "It shares its parent with {} other task(s).",
                self.sibling_ids.len()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PitchEntry;

    #[test]
    fn test_task_display() {
        let mut task = Task::new("PL-1", "write the parser").with_status(TaskStatus::Ready);
        task.acceptance_criteria = vec!["parses the fixtures".to_string()];

        let output = task.to_string();
        assert!(output.contains("### write the parser (▶ Ready)"));
        assert!(output.contains("#### Acceptance"));
        assert!(output.contains("- parses the fixtures"));
        assert!(!output.contains("#### Output"));
    }

    #[test]
    fn test_pitch_display() {
        let pitch = Pitch {
            plan_goal: "ship feature X".to_string(),
            high_level_plan: vec![PitchEntry {
                task_id: "TA-1".to_string(),
                goal: "ship feature X".to_string(),
                description: None,
            }],
            task_id: "TA-2".to_string(),
            task_goal: "write code".to_string(),
            task_description: Some("implement the parser".to_string()),
            task_command: "write_file".to_string(),
            path: vec!["ship feature X".to_string(), "write code".to_string()],
            sibling_ids: Vec::new(),
        };

        let output = pitch.to_string();
        assert!(output.contains("achieve the following task: implement the parser"));
        assert!(output.contains("our goal (ship feature X)"));
        assert!(output.contains("ship feature X → write code"));
        assert!(!output.contains("shares its parent"));
    }
}
