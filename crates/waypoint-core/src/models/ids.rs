//! Identifier generation for tasks and plans.

use uuid::Uuid;

/// Prefix carried by every task id.
pub const TASK_ID_PREFIX: &str = "TA";

/// Prefix carried by every plan id.
pub const PLAN_ID_PREFIX: &str = "PL";

/// Generates a fresh task id (`TA` followed by a v4 UUID).
pub fn generate_task_id() -> String {
    format!("{TASK_ID_PREFIX}{}", Uuid::new_v4())
}

/// Generates a fresh plan id (`PL` followed by a v4 UUID).
pub fn generate_plan_id() -> String {
    format!("{PLAN_ID_PREFIX}{}", Uuid::new_v4())
}

/// Whether the id was produced by [`generate_plan_id`].
pub fn is_plan_id(id: &str) -> bool {
    id.starts_with(PLAN_ID_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_distinguish_tasks_and_plans() {
        let task_id = generate_task_id();
        let plan_id = generate_plan_id();

        assert!(task_id.starts_with("TA"));
        assert!(plan_id.starts_with("PL"));
        assert!(is_plan_id(&plan_id));
        assert!(!is_plan_id(&task_id));
        assert_ne!(generate_task_id(), task_id);
    }
}
