//! Task CRUD operations and queries.

use rusqlite::{params, params_from_iter, types::Value as SqlValue, OptionalExtension};

use super::utils::{json_column, map_insert_error, status_column, timestamp_column};
use crate::{
    error::{DatabaseResultExt, PlanError, Result},
    models::{Task, TaskFilter},
};

const INSERT_TASK_SQL: &str = "INSERT INTO tasks (task_id, plan_id, parent_id, predecessor_ids, status, responsible_agent_id, goal, description, command, arguments, acceptance_criteria, output, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";
const UPDATE_TASK_SQL: &str = "UPDATE tasks SET plan_id = ?2, parent_id = ?3, predecessor_ids = ?4, status = ?5, responsible_agent_id = ?6, goal = ?7, description = ?8, command = ?9, arguments = ?10, acceptance_criteria = ?11, output = ?12, created_at = ?13, updated_at = ?14 WHERE task_id = ?1";
const SELECT_TASK_BY_ID_SQL: &str = "SELECT task_id, plan_id, parent_id, predecessor_ids, status, responsible_agent_id, goal, description, command, arguments, acceptance_criteria, output, created_at, updated_at FROM tasks WHERE task_id = ?1";
const SELECT_TASKS_SQL: &str = "SELECT task_id, plan_id, parent_id, predecessor_ids, status, responsible_agent_id, goal, description, command, arguments, acceptance_criteria, output, created_at, updated_at FROM tasks";

/// Column values of a task in statement order (`?1` .. `?14`).
struct TaskRow {
    values: [SqlValue; 14],
}

impl TaskRow {
    fn encode(task: &Task) -> Result<Self> {
        let text = |s: &str| SqlValue::Text(s.to_string());
        let opt_text = |s: &Option<String>| s.as_deref().map_or(SqlValue::Null, text);

        Ok(Self {
            values: [
                text(&task.task_id),
                text(&task.plan_id),
                opt_text(&task.parent_id),
                SqlValue::Text(serde_json::to_string(&task.predecessor_ids)?),
                text(task.status.as_str()),
                opt_text(&task.responsible_agent_id),
                text(&task.goal),
                opt_text(&task.description),
                text(&task.command),
                SqlValue::Text(serde_json::to_string(&task.arguments)?),
                SqlValue::Text(serde_json::to_string(&task.acceptance_criteria)?),
                opt_text(&task.output),
                SqlValue::Text(task.created_at.to_string()),
                SqlValue::Text(task.updated_at.to_string()),
            ],
        })
    }
}

impl super::Database {
    /// Helper function to construct a Task from a database row
    fn build_task_from_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        Ok(Task {
            task_id: row.get(0)?,
            plan_id: row.get(1)?,
            parent_id: row.get(2)?,
            predecessor_ids: json_column(row, 3)?,
            status: status_column(row, 4)?,
            responsible_agent_id: row.get(5)?,
            goal: row.get(6)?,
            description: row.get(7)?,
            command: row.get(8)?,
            arguments: json_column(row, 9)?,
            acceptance_criteria: json_column(row, 10)?,
            output: row.get(11)?,
            created_at: timestamp_column(row, 12)?,
            updated_at: timestamp_column(row, 13)?,
        })
    }

    /// Inserts a new task. Fails with `Conflict` when the id already exists.
    pub fn insert_task(&self, task: &Task) -> Result<()> {
        let row = TaskRow::encode(task)?;
        self.connection
            .execute(INSERT_TASK_SQL, params_from_iter(row.values.iter()))
            .map_err(|e| map_insert_error(e, &task.task_id, "Failed to insert task"))?;
        Ok(())
    }

    /// Replaces the stored task. Fails with `TaskNotFound` when absent.
    pub fn update_task(&self, task: &Task) -> Result<()> {
        let row = TaskRow::encode(task)?;
        let changed = self
            .connection
            .execute(UPDATE_TASK_SQL, params_from_iter(row.values.iter()))
            .db_context("Failed to update task")?;

        if changed == 0 {
            return Err(PlanError::TaskNotFound {
                id: task.task_id.clone(),
            });
        }
        Ok(())
    }

    /// Retrieves a single task by its ID.
    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        self.connection
            .query_row(SELECT_TASK_BY_ID_SQL, params![task_id], Self::build_task_from_row)
            .optional()
            .db_context("Failed to get task")
    }

    /// Lists tasks matching the filter in insertion order.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut conditions = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(plan_id) = &filter.plan_id {
            values.push(SqlValue::Text(plan_id.clone()));
            conditions.push(format!("plan_id = ?{}", values.len()));
        }
        if let Some(parent_id) = &filter.parent_id {
            values.push(SqlValue::Text(parent_id.clone()));
            conditions.push(format!("parent_id = ?{}", values.len()));
        }
        if let Some(status) = filter.status {
            values.push(SqlValue::Text(status.as_str().to_string()));
            conditions.push(format!("status = ?{}", values.len()));
        }

        let mut sql = SELECT_TASKS_SQL.to_string();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY seq");

        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare task listing")?;

        let tasks = stmt
            .query_map(params_from_iter(values.iter()), Self::build_task_from_row)
            .db_context("Failed to list tasks")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read task rows")?;

        Ok(tasks)
    }
}
