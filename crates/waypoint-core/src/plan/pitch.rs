//! Briefings for the agent executing a task.

use std::collections::HashSet;

use super::Plan;
use crate::error::{PlanError, Result};

/// A top-level task as shown in a pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchEntry {
    pub task_id: String,
    pub goal: String,
    pub description: Option<String>,
}

/// Context handed to the agent about to work on a task.
///
/// Renders as markdown through its `Display` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pitch {
    /// The plan's goal sentence
    pub plan_goal: String,
    /// Top-level tasks of the plan, in registration order
    pub high_level_plan: Vec<PitchEntry>,
    /// The task being pitched
    pub task_id: String,
    pub task_goal: String,
    pub task_description: Option<String>,
    pub task_command: String,
    /// Goals from the top-level ancestor down to the task
    pub path: Vec<String>,
    /// Other tasks sharing the task's parent
    pub sibling_ids: Vec<String>,
}

impl Plan {
    /// Builds the briefing for `task_id`, or for the oldest ready task.
    ///
    /// Fails with `TaskNotFound` for unknown ids and with `InvalidInput` when
    /// no id is given and nothing is ready.
    pub async fn generate_pitch(&self, task_id: Option<&str>) -> Result<Pitch> {
        let mut state = self.state.lock().await;

        let target_id = match task_id {
            Some(id) => id.to_string(),
            None => state.ready.first().map(String::from).ok_or_else(|| {
                PlanError::invalid_input("task_id").with_reason("no task is ready to pitch")
            })?,
        };
        let target = self.load_cloned(&mut state, &target_id).await?;

        let top_level: Vec<String> = state
            .all
            .iter()
            .filter(|id| {
                state.index.get(id).map_or(false, |node| {
                    node.parent_id
                        .as_deref()
                        .map_or(true, |parent| parent == self.plan_id)
                })
            })
            .map(String::from)
            .collect();
        let mut high_level_plan = Vec::with_capacity(top_level.len());
        for id in top_level {
            let task = self.load_cloned(&mut state, &id).await?;
            high_level_plan.push(PitchEntry {
                task_id: task.task_id,
                goal: task.goal,
                description: task.description,
            });
        }

        let mut chain = vec![target_id.clone()];
        let mut visited: HashSet<String> = chain.iter().cloned().collect();
        let mut cursor = target.parent_id.clone();
        while let Some(parent) = cursor {
            if parent == self.plan_id || !state.all.contains(&parent) || !visited.insert(parent.clone()) {
                break;
            }
            cursor = state.index.get(&parent).and_then(|node| node.parent_id.clone());
            chain.push(parent);
        }
        chain.reverse();

        let mut path = Vec::with_capacity(chain.len());
        for id in &chain {
            path.push(self.load_cloned(&mut state, id).await?.goal);
        }

        let sibling_ids = state
            .all
            .iter()
            .filter(|id| *id != target_id)
            .filter(|id| {
                state
                    .index
                    .get(id)
                    .map_or(false, |node| node.parent_id == target.parent_id)
            })
            .map(String::from)
            .collect();

        Ok(Pitch {
            plan_goal: state.record.goal.clone(),
            high_level_plan,
            task_id: target.task_id,
            task_goal: target.goal,
            task_description: target.description,
            task_command: target.command,
            path,
            sibling_ids,
        })
    }
}
