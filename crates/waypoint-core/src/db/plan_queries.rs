//! Plan record CRUD operations and queries.

use rusqlite::{params, OptionalExtension};

use super::utils::{json_column, map_insert_error, status_column, timestamp_column};
use crate::{
    error::{DatabaseResultExt, PlanError, Result},
    models::{PlanFilter, PlanRecord},
};

const INSERT_PLAN_SQL: &str = "INSERT INTO plans (plan_id, agent_id, goal, status, task_ids, ready_task_ids, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const UPDATE_PLAN_SQL: &str = "UPDATE plans SET agent_id = ?2, goal = ?3, status = ?4, task_ids = ?5, ready_task_ids = ?6, created_at = ?7, updated_at = ?8 WHERE plan_id = ?1";
const SELECT_PLAN_BY_ID_SQL: &str = "SELECT plan_id, agent_id, goal, status, task_ids, ready_task_ids, created_at, updated_at FROM plans WHERE plan_id = ?1";
const SELECT_ALL_PLANS_SQL: &str = "SELECT plan_id, agent_id, goal, status, task_ids, ready_task_ids, created_at, updated_at FROM plans ORDER BY created_at, plan_id";
const SELECT_PLANS_BY_AGENT_SQL: &str = "SELECT plan_id, agent_id, goal, status, task_ids, ready_task_ids, created_at, updated_at FROM plans WHERE agent_id = ?1 ORDER BY created_at, plan_id";

impl super::Database {
    /// Helper function to construct a PlanRecord from a database row
    fn build_plan_from_row(row: &rusqlite::Row) -> rusqlite::Result<PlanRecord> {
        Ok(PlanRecord {
            plan_id: row.get(0)?,
            agent_id: row.get(1)?,
            goal: row.get(2)?,
            status: status_column(row, 3)?,
            task_ids: json_column(row, 4)?,
            ready_task_ids: json_column(row, 5)?,
            created_at: timestamp_column(row, 6)?,
            updated_at: timestamp_column(row, 7)?,
        })
    }

    /// Inserts a new plan record. Fails with `Conflict` when the id exists.
    pub fn insert_plan(&self, record: &PlanRecord) -> Result<()> {
        let task_ids = serde_json::to_string(&record.task_ids)?;
        let ready_task_ids = serde_json::to_string(&record.ready_task_ids)?;

        self.connection
            .execute(
                INSERT_PLAN_SQL,
                params![
                    &record.plan_id,
                    &record.agent_id,
                    &record.goal,
                    record.status.as_str(),
                    task_ids,
                    ready_task_ids,
                    record.created_at.to_string(),
                    record.updated_at.to_string(),
                ],
            )
            .map_err(|e| map_insert_error(e, &record.plan_id, "Failed to insert plan"))?;
        Ok(())
    }

    /// Replaces the stored plan record. Fails with `PlanNotFound` when absent.
    pub fn update_plan(&self, record: &PlanRecord) -> Result<()> {
        let task_ids = serde_json::to_string(&record.task_ids)?;
        let ready_task_ids = serde_json::to_string(&record.ready_task_ids)?;

        let changed = self
            .connection
            .execute(
                UPDATE_PLAN_SQL,
                params![
                    &record.plan_id,
                    &record.agent_id,
                    &record.goal,
                    record.status.as_str(),
                    task_ids,
                    ready_task_ids,
                    record.created_at.to_string(),
                    record.updated_at.to_string(),
                ],
            )
            .db_context("Failed to update plan")?;

        if changed == 0 {
            return Err(PlanError::PlanNotFound {
                id: record.plan_id.clone(),
            });
        }
        Ok(())
    }

    /// Retrieves a plan record by its ID.
    pub fn get_plan(&self, plan_id: &str) -> Result<Option<PlanRecord>> {
        self.connection
            .query_row(SELECT_PLAN_BY_ID_SQL, params![plan_id], Self::build_plan_from_row)
            .optional()
            .db_context("Failed to get plan")
    }

    /// Lists plan records, oldest first.
    pub fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<PlanRecord>> {
        let plans = match &filter.agent_id {
            Some(agent_id) => {
                let mut stmt = self
                    .connection
                    .prepare(SELECT_PLANS_BY_AGENT_SQL)
                    .db_context("Failed to prepare plan listing")?;
                let rows = stmt
                    .query_map(params![agent_id], Self::build_plan_from_row)
                    .db_context("Failed to list plans")?;
                let plans = rows.collect::<rusqlite::Result<Vec<_>>>();
                plans
            }
            None => {
                let mut stmt = self
                    .connection
                    .prepare(SELECT_ALL_PLANS_SQL)
                    .db_context("Failed to prepare plan listing")?;
                let rows = stmt
                    .query_map([], Self::build_plan_from_row)
                    .db_context("Failed to list plans")?;
                let plans = rows.collect::<rusqlite::Result<Vec<_>>>();
                plans
            }
        };

        plans.db_context("Failed to read plan rows")
    }
}
