//! Process-local store adapter.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use super::TaskStore;
use crate::{
    error::{PlanError, Result},
    models::{PlanFilter, PlanRecord, Task, TaskFilter},
};

/// Number of writes an adapter has accepted, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub task_adds: usize,
    pub task_updates: usize,
    pub plan_adds: usize,
    pub plan_updates: usize,
}

impl WriteStats {
    /// Total number of accepted writes.
    pub fn total(&self) -> usize {
        self.task_adds + self.task_updates + self.plan_adds + self.plan_updates
    }
}

#[derive(Default)]
struct Tables {
    tasks: Vec<Task>,
    task_index: HashMap<String, usize>,
    plans: Vec<PlanRecord>,
    plan_index: HashMap<String, usize>,
    stats: WriteStats,
}

/// In-memory [`TaskStore`], mainly for tests and ephemeral agents.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes accepted so far.
    pub fn write_stats(&self) -> WriteStats {
        self.lock().map(|tables| tables.stats).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| PlanError::store_unavailable("Memory store lock poisoned").with_source("poisoned mutex"))
    }
}

impl TaskStore for MemoryStore {
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tables = self.lock()?;
        Ok(tables
            .tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect())
    }

    fn get_task(&self, task_id: &str) -> Result<Task> {
        let tables = self.lock()?;
        tables
            .task_index
            .get(task_id)
            .map(|&idx| tables.tasks[idx].clone())
            .ok_or_else(|| PlanError::TaskNotFound {
                id: task_id.to_string(),
            })
    }

    fn add_task(&self, task: &Task) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.task_index.contains_key(&task.task_id) {
            return Err(PlanError::Conflict {
                id: task.task_id.clone(),
            });
        }
        let idx = tables.tasks.len();
        tables.tasks.push(task.clone());
        tables.task_index.insert(task.task_id.clone(), idx);
        tables.stats.task_adds += 1;
        Ok(())
    }

    fn update_task(&self, task: &Task) -> Result<()> {
        let mut tables = self.lock()?;
        let idx = *tables
            .task_index
            .get(&task.task_id)
            .ok_or_else(|| PlanError::TaskNotFound {
                id: task.task_id.clone(),
            })?;
        tables.tasks[idx] = task.clone();
        tables.stats.task_updates += 1;
        Ok(())
    }

    fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<PlanRecord>> {
        let tables = self.lock()?;
        Ok(tables
            .plans
            .iter()
            .filter(|plan| {
                filter
                    .agent_id
                    .as_ref()
                    .map_or(true, |agent_id| &plan.agent_id == agent_id)
            })
            .cloned()
            .collect())
    }

    fn get_plan(&self, plan_id: &str) -> Result<PlanRecord> {
        let tables = self.lock()?;
        tables
            .plan_index
            .get(plan_id)
            .map(|&idx| tables.plans[idx].clone())
            .ok_or_else(|| PlanError::PlanNotFound {
                id: plan_id.to_string(),
            })
    }

    fn add_plan(&self, record: &PlanRecord) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.plan_index.contains_key(&record.plan_id) {
            return Err(PlanError::Conflict {
                id: record.plan_id.clone(),
            });
        }
        let idx = tables.plans.len();
        tables.plans.push(record.clone());
        tables.plan_index.insert(record.plan_id.clone(), idx);
        tables.stats.plan_adds += 1;
        Ok(())
    }

    fn update_plan(&self, record: &PlanRecord) -> Result<()> {
        let mut tables = self.lock()?;
        let idx = *tables
            .plan_index
            .get(&record.plan_id)
            .ok_or_else(|| PlanError::PlanNotFound {
                id: record.plan_id.clone(),
            })?;
        tables.plans[idx] = record.clone();
        tables.stats.plan_updates += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    #[test]
    fn test_add_conflicts_on_existing_id() {
        let store = MemoryStore::new();
        let task = Task::new("PL-1", "first");

        store.add_task(&task).unwrap();
        let err = store.add_task(&task).unwrap_err();
        assert!(matches!(err, PlanError::Conflict { id } if id == task.task_id));
        assert_eq!(store.write_stats().task_adds, 1);
    }

    #[test]
    fn test_update_requires_existing_record() {
        let store = MemoryStore::new();
        let mut task = Task::new("PL-1", "first");

        assert!(matches!(
            store.update_task(&task),
            Err(PlanError::TaskNotFound { .. })
        ));

        store.add_task(&task).unwrap();
        task.status = TaskStatus::Done;
        store.update_task(&task).unwrap();
        assert_eq!(store.get_task(&task.task_id).unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn test_list_filters_and_keeps_insertion_order() {
        let store = MemoryStore::new();
        let a = Task::new("PL-1", "a");
        let b = Task::new("PL-2", "b");
        let c = Task::new("PL-1", "c").with_status(TaskStatus::Ready);
        for task in [&a, &b, &c] {
            store.add_task(task).unwrap();
        }

        let listed = store.list_tasks(&TaskFilter::for_plan("PL-1")).unwrap();
        let goals: Vec<_> = listed.iter().map(|t| t.goal.as_str()).collect();
        assert_eq!(goals, vec!["a", "c"]);

        let ready = store
            .list_tasks(&TaskFilter::for_plan("PL-1").with_status(TaskStatus::Ready))
            .unwrap();
        assert_eq!(ready.len(), 1);
        assert!(store.list_tasks(&TaskFilter::for_plan("PL-9")).unwrap().is_empty());
    }

    #[test]
    fn test_plan_records() {
        let store = MemoryStore::new();
        let record = PlanRecord::new("agent-1", "goal");

        assert!(matches!(
            store.get_plan(&record.plan_id),
            Err(PlanError::PlanNotFound { .. })
        ));
        store.add_plan(&record).unwrap();
        store.update_plan(&record).unwrap();
        assert_eq!(store.get_plan(&record.plan_id).unwrap(), record);
        assert_eq!(store.list_plans(&PlanFilter::for_agent("agent-1")).unwrap().len(), 1);
        assert!(store.list_plans(&PlanFilter::for_agent("agent-2")).unwrap().is_empty());
        assert_eq!(store.write_stats().total(), 2);
    }
}
