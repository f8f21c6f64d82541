use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use super::*;
use crate::{
    models::{FailurePolicy, PlanFilter, TaskFilter, TaskStatus, DEFAULT_COMMAND},
    store::{MemoryStore, TaskStore},
};

fn memory() -> (Arc<MemoryStore>, SharedStore) {
    let store = Arc::new(MemoryStore::new());
    let shared: SharedStore = store.clone();
    (store, shared)
}

async fn fresh_plan(store: SharedStore) -> Plan {
    Plan::create(store, PlanConfig::default(), "agent-1", "ship feature X")
        .await
        .unwrap()
}

fn child(plan: &Plan, goal: &str) -> Task {
    Task::new(plan.plan_id(), goal).with_parent(plan.plan_id())
}

/// Store that rejects writes of selected task ids.
struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<String>>,
    unreadable: Mutex<HashSet<String>>,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: Mutex::new(HashSet::new()),
            unreadable: Mutex::new(HashSet::new()),
        }
    }

    fn fail(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    fn fail_reads(&self, id: &str) {
        self.unreadable.lock().unwrap().insert(id.to_string());
    }

    fn heal(&self) {
        self.failing.lock().unwrap().clear();
        self.unreadable.lock().unwrap().clear();
    }

    fn check(&self, id: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(id) {
            return Err(PlanError::store_unavailable("write rejected").with_source("flaky store"));
        }
        Ok(())
    }
}

impl TaskStore for FlakyStore {
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.inner.list_tasks(filter)
    }

    fn get_task(&self, task_id: &str) -> Result<Task> {
        if self.unreadable.lock().unwrap().contains(task_id) {
            return Err(PlanError::store_unavailable("read rejected").with_source("flaky store"));
        }
        self.inner.get_task(task_id)
    }

    fn add_task(&self, task: &Task) -> Result<()> {
        self.check(&task.task_id)?;
        self.inner.add_task(task)
    }

    fn update_task(&self, task: &Task) -> Result<()> {
        self.check(&task.task_id)?;
        self.inner.update_task(task)
    }

    fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<PlanRecord>> {
        self.inner.list_plans(filter)
    }

    fn get_plan(&self, plan_id: &str) -> Result<PlanRecord> {
        self.inner.get_plan(plan_id)
    }

    fn add_plan(&self, record: &PlanRecord) -> Result<()> {
        self.inner.add_plan(record)
    }

    fn update_plan(&self, record: &PlanRecord) -> Result<()> {
        self.inner.update_plan(record)
    }
}

#[tokio::test]
async fn test_fresh_plan_is_seeded_with_ready_root() {
    let (store, shared) = memory();
    let plan = fresh_plan(shared).await;

    let ready = plan.get_ready_tasks().await.unwrap();
    assert_eq!(ready.len(), 1);
    let root = &ready[0];
    assert_eq!(root.goal, "ship feature X");
    assert_eq!(root.parent_id.as_deref(), Some(plan.plan_id()));
    assert_eq!(root.command, DEFAULT_COMMAND);
    assert_eq!(root.arguments["note_to_agent_length"], 400);
    assert_eq!(plan.new_task_ids().await, vec![root.task_id.clone()]);

    let record = store.get_plan(plan.plan_id()).unwrap();
    assert_eq!(record.agent_id, "agent-1");
    assert_eq!(record.task_ids, vec![root.task_id.clone()]);
    assert!(store.get_task(&root.task_id).is_err());
}

#[tokio::test]
async fn test_completing_predecessor_promotes_dependent() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;

    let a = child(&plan, "A").with_status(TaskStatus::Ready);
    let b = child(&plan, "B")
        .with_predecessors([a.task_id.clone()])
        .with_status(TaskStatus::Ready);
    let (a_id, b_id) = (a.task_id.clone(), b.task_id.clone());
    plan.register_tasks(vec![a, b]).await.unwrap();

    assert_eq!(plan.status_of(&b_id).await.unwrap(), TaskStatus::Backlog);
    assert!(!plan.ready_task_ids().await.contains(&b_id));

    let update = plan.set_status(&a_id, TaskStatus::Done).await.unwrap();
    assert_eq!(update.promoted, vec![b_id.clone()]);
    assert_eq!(plan.status_of(&b_id).await.unwrap(), TaskStatus::Ready);
    assert!(!plan.ready_task_ids().await.contains(&a_id));
    assert!(plan.ready_task_ids().await.contains(&b_id));
}

#[tokio::test]
async fn test_ship_feature_scenario() {
    let (store, shared) = memory();
    let plan = fresh_plan(shared).await;
    let root = plan.get_first_ready_task().await.unwrap().unwrap();
    assert_eq!(root.status, TaskStatus::Ready);

    // The planning task is finished once it has produced the subtasks.
    plan.set_status(&root.task_id, TaskStatus::Done).await.unwrap();

    let c1 = Task::new(plan.plan_id(), "write code")
        .with_parent(&root.task_id)
        .with_status(TaskStatus::Ready);
    let c2 = Task::new(plan.plan_id(), "write tests")
        .with_parent(&root.task_id)
        .with_predecessors([c1.task_id.clone()]);
    let (c1_id, c2_id) = (c1.task_id.clone(), c2.task_id.clone());
    plan.register_tasks(vec![c1, c2]).await.unwrap();

    assert_eq!(plan.ready_task_ids().await, vec![c1_id.clone()]);
    assert_eq!(plan.status_of(&c2_id).await.unwrap(), TaskStatus::Backlog);

    let update = plan.set_status(&c1_id, TaskStatus::Done).await.unwrap();
    assert_eq!(update.promoted, vec![c2_id.clone()]);
    assert_eq!(plan.ready_task_ids().await, vec![c2_id.clone()]);

    let report = plan.save().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(
        report.created,
        vec![root.task_id.clone(), c1_id.clone(), c2_id.clone()]
    );
    assert!(report.plan_record_written);

    assert_eq!(store.get_task(&root.task_id).unwrap().status, TaskStatus::Done);
    assert_eq!(store.get_task(&c1_id).unwrap().status, TaskStatus::Done);
    assert_eq!(store.get_task(&c2_id).unwrap().status, TaskStatus::Ready);
    let record = store.get_plan(plan.plan_id()).unwrap();
    assert_eq!(record.task_ids, vec![root.task_id.clone(), c1_id, c2_id.clone()]);
    assert_eq!(record.ready_task_ids, vec![c2_id]);
    assert_eq!(record.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn test_second_save_writes_nothing() {
    let (store, shared) = memory();
    let plan = fresh_plan(shared).await;
    plan.register_task(child(&plan, "A")).await.unwrap();

    plan.save().await.unwrap();
    let before = store.write_stats();

    let report = plan.save().await.unwrap();
    assert_eq!(report.writes(), 0);
    assert_eq!(store.write_stats(), before);
    assert!(plan.modified_task_ids().await.is_empty());
    assert!(plan.new_task_ids().await.is_empty());
}

#[tokio::test]
async fn test_setting_same_status_is_noop() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    plan.save().await.unwrap();
    let root = plan.get_first_ready_task().await.unwrap().unwrap();

    let update = plan.set_status(&root.task_id, TaskStatus::Ready).await.unwrap();
    assert!(!update.status_changed());
    assert!(plan.modified_task_ids().await.is_empty());
}

#[tokio::test]
async fn test_invalid_transitions_are_rejected() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    let a = child(&plan, "A");
    let b = child(&plan, "B").with_predecessors([a.task_id.clone()]);
    let (a_id, b_id) = (a.task_id.clone(), b.task_id.clone());
    plan.register_tasks(vec![a, b]).await.unwrap();

    let err = plan.set_status(&b_id, TaskStatus::Ready).await.unwrap_err();
    assert!(matches!(err, PlanError::InvalidTransition { .. }));
    let err = plan.set_status(&b_id, TaskStatus::InProgress).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::InvalidTransition {
            from: TaskStatus::Backlog,
            to: TaskStatus::InProgress,
            ..
        }
    ));

    plan.set_status(&a_id, TaskStatus::Done).await.unwrap();
    let err = plan.set_status(&a_id, TaskStatus::Ready).await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(plan.status_of(&a_id).await.unwrap(), TaskStatus::Done);
}

#[tokio::test]
async fn test_registration_rejects_cycles_atomically() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    let mut a = child(&plan, "A");
    let b = child(&plan, "B").with_predecessors([a.task_id.clone()]);
    a.predecessor_ids = vec![b.task_id.clone()];
    let before = plan.all_task_ids().await;

    let err = plan.register_tasks(vec![a, b]).await.unwrap_err();
    assert!(matches!(err, PlanError::InvariantViolation { .. }));
    assert_eq!(plan.all_task_ids().await, before);
    assert_eq!(plan.new_task_ids().await.len(), 1);
}

#[tokio::test]
async fn test_child_waiting_on_its_parent_is_a_cycle() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    let parent = child(&plan, "parent");
    let sub = Task::new(plan.plan_id(), "sub")
        .with_parent(&parent.task_id)
        .with_predecessors([parent.task_id.clone()]);

    let err = plan.register_tasks(vec![parent, sub]).await.unwrap_err();
    assert!(matches!(err, PlanError::InvariantViolation { reason } if reason.contains("cycle")));
}

#[tokio::test]
async fn test_registration_rejects_bad_references() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;

    let mut own = child(&plan, "self");
    own.predecessor_ids = vec![own.task_id.clone()];
    let unknown = child(&plan, "unknown").with_predecessors(["TA-missing"]);
    let foreign = Task::new("PL-other", "foreign");

    for task in [own, unknown, foreign] {
        let err = plan.register_task(task).await.unwrap_err();
        assert!(matches!(err, PlanError::InvariantViolation { .. }));
    }
    assert_eq!(plan.all_task_ids().await.len(), 1);
}

#[tokio::test]
async fn test_registration_is_idempotent() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    let a = child(&plan, "A");

    let first = plan.register_tasks(vec![a.clone(), a.clone()]).await.unwrap();
    let second = plan.register_tasks(vec![a]).await.unwrap();

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(plan.all_task_ids().await.len(), 2);
}

#[tokio::test]
async fn test_failure_policies() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    let a = child(&plan, "A");
    let b = child(&plan, "B").with_predecessors([a.task_id.clone()]);
    let (a_id, b_id) = (a.task_id.clone(), b.task_id.clone());
    plan.register_tasks(vec![a, b]).await.unwrap();

    let update = plan.set_status(&a_id, TaskStatus::Failed).await.unwrap();
    assert!(update.failed.is_empty());
    assert_eq!(plan.status_of(&b_id).await.unwrap(), TaskStatus::Backlog);

    let (_, shared) = memory();
    let config = PlanConfig {
        failure_policy: FailurePolicy::FailDependents,
        ..PlanConfig::default()
    };
    let plan = Plan::create(shared, config, "agent-2", "goal").await.unwrap();
    let a = child(&plan, "A");
    let b = child(&plan, "B").with_predecessors([a.task_id.clone()]);
    let c = child(&plan, "C").with_predecessors([b.task_id.clone()]);
    let (a_id, b_id, c_id) = (a.task_id.clone(), b.task_id.clone(), c.task_id.clone());
    plan.register_tasks(vec![a, b, c]).await.unwrap();

    let update = plan.set_status(&a_id, TaskStatus::Failed).await.unwrap();
    assert_eq!(update.failed, vec![b_id.clone(), c_id.clone()]);
    assert_eq!(plan.status_of(&c_id).await.unwrap(), TaskStatus::Failed);
}

#[tokio::test]
async fn test_failed_writes_stay_dirty_until_retried() {
    let store = Arc::new(FlakyStore::new());
    let shared: SharedStore = store.clone();
    let plan = fresh_plan(shared).await;
    let a = child(&plan, "A");
    let b = child(&plan, "B");
    let (a_id, b_id) = (a.task_id.clone(), b.task_id.clone());
    plan.register_tasks(vec![a, b]).await.unwrap();

    store.fail(&b_id);
    let report = plan.save().await.unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].task_id, b_id);
    assert_eq!(report.failures[0].phase, SavePhase::Create);
    assert!(report.created.contains(&a_id));
    assert_eq!(plan.new_task_ids().await, vec![b_id.clone()]);

    store.heal();
    let report = plan.save().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.created, vec![b_id.clone()]);
    assert!(store.get_task(&b_id).is_ok());
}

#[tokio::test]
async fn test_resume_rebuilds_index_without_loading() {
    let (store, shared) = memory();
    let plan = fresh_plan(shared.clone()).await;
    let root_id = plan.ready_task_ids().await[0].clone();
    let a = child(&plan, "A");
    let b = child(&plan, "B").with_predecessors([a.task_id.clone()]);
    let (a_id, b_id) = (a.task_id.clone(), b.task_id.clone());
    plan.register_tasks(vec![a, b]).await.unwrap();
    plan.save().await.unwrap();
    let plan_id = plan.plan_id().to_string();
    drop(plan);

    let resumed = Plan::resume(shared, PlanConfig::default(), "agent-1", &plan_id)
        .await
        .unwrap();
    assert_eq!(resumed.all_task_ids().await, vec![root_id.clone(), a_id.clone(), b_id.clone()]);
    assert_eq!(resumed.ready_task_ids().await, vec![root_id, a_id.clone()]);
    assert!(!resumed.is_loaded(&a_id).await);

    let loaded = resumed.get_task(&a_id).await.unwrap();
    assert_eq!(loaded, store.get_task(&a_id).unwrap());
    assert!(resumed.is_loaded(&a_id).await);
    assert!(resumed.modified_task_ids().await.is_empty());

    let err = Plan::resume(store.clone(), PlanConfig::default(), "agent-9", &plan_id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvariantViolation { .. }));
}

#[tokio::test]
async fn test_resume_promotes_unblocked_backlog() {
    let (store, shared) = memory();
    let plan = fresh_plan(shared.clone()).await;
    let a = child(&plan, "A").with_status(TaskStatus::Done);
    let b = child(&plan, "B");
    let b_id = b.task_id.clone();
    plan.register_tasks(vec![a.clone()]).await.unwrap();
    plan.save().await.unwrap();

    // Written behind the plan's back, as a crashed agent might have left it.
    let b = b.with_predecessors([a.task_id.clone()]);
    store.add_task(&b).unwrap();

    let resumed = Plan::resume(shared, PlanConfig::default(), "agent-1", plan.plan_id())
        .await
        .unwrap();
    assert_eq!(resumed.status_of(&b_id).await.unwrap(), TaskStatus::Ready);
    assert_eq!(resumed.modified_task_ids().await, vec![b_id.clone()]);

    resumed.save().await.unwrap();
    assert_eq!(store.get_task(&b_id).unwrap().status, TaskStatus::Ready);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;

    assert!(plan.get_task("TA-nope").await.unwrap_err().is_not_found());
    assert!(plan.mark_modified("TA-nope").await.unwrap_err().is_not_found());
    assert!(plan
        .set_status("TA-nope", TaskStatus::Done)
        .await
        .unwrap_err()
        .is_not_found());
    assert!(plan.generate_pitch(Some("TA-nope")).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_mark_modified() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    let root_id = plan.ready_task_ids().await[0].clone();

    plan.mark_modified(&root_id).await.unwrap();
    assert!(plan.modified_task_ids().await.is_empty());

    plan.save().await.unwrap();
    plan.mark_modified(&root_id).await.unwrap();
    plan.mark_modified(&root_id).await.unwrap();
    assert_eq!(plan.modified_task_ids().await, vec![root_id.clone()]);

    let report = plan.save().await.unwrap();
    assert_eq!(report.updated, vec![root_id]);
}

#[tokio::test]
async fn test_update_task_keeps_structure_fixed() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    let root_id = plan.ready_task_ids().await[0].clone();

    let err = plan
        .update_task(&root_id, |task| task.task_id = "TA-other".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvariantViolation { .. }));

    let update = plan
        .update_task(&root_id, |task| {
            task.output = Some("plan drafted".to_string());
            task.status = TaskStatus::Done;
        })
        .await
        .unwrap();
    assert_eq!(update.previous_status, TaskStatus::Ready);
    assert_eq!(update.task.output.as_deref(), Some("plan drafted"));
    assert!(plan.ready_task_ids().await.is_empty());
}

#[tokio::test]
async fn test_dirty_tasks_survive_cache_pressure() {
    let (store, shared) = memory();
    let config = PlanConfig {
        cache_capacity: 1,
        ..PlanConfig::default()
    };
    let plan = Plan::create(shared, config, "agent-1", "goal").await.unwrap();
    let tasks: Vec<Task> = (0..4).map(|i| child(&plan, &format!("T{i}"))).collect();
    plan.register_tasks(tasks).await.unwrap();

    let report = plan.save().await.unwrap();
    assert_eq!(report.created.len(), 5);
    assert_eq!(
        store
            .list_tasks(&TaskFilter::for_plan(plan.plan_id()))
            .unwrap()
            .len(),
        5
    );
}

#[tokio::test]
async fn test_pitch_describes_task_in_context() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    let root = plan.get_first_ready_task().await.unwrap().unwrap();
    let mut c1 = Task::new(plan.plan_id(), "write code").with_parent(&root.task_id);
    c1.description = Some("implement the parser".to_string());
    let c2 = Task::new(plan.plan_id(), "write tests").with_parent(&root.task_id);
    let (c1_id, c2_id) = (c1.task_id.clone(), c2.task_id.clone());
    plan.register_tasks(vec![c1, c2]).await.unwrap();

    let pitch = plan.generate_pitch(Some(&c1_id)).await.unwrap();
    assert_eq!(pitch.plan_goal, "ship feature X");
    assert_eq!(pitch.path, vec!["ship feature X".to_string(), "write code".to_string()]);
    assert_eq!(pitch.sibling_ids, vec![c2_id]);
    assert_eq!(pitch.high_level_plan.len(), 1);
    assert_eq!(pitch.high_level_plan[0].task_id, root.task_id);

    let first = plan.generate_pitch(None).await.unwrap();
    assert_eq!(first.task_id, root.task_id);
}

#[tokio::test]
async fn test_autosave_flushes_until_stopped() {
    let (store, shared) = memory();
    let plan = Arc::new(fresh_plan(shared).await);
    let handle = plan.spawn_autosave(std::time::Duration::from_millis(10));

    let mut flushed = false;
    for _ in 0..100 {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        if plan.new_task_ids().await.is_empty() {
            flushed = true;
            break;
        }
    }
    assert!(flushed, "autosave never flushed the seed task");
    assert_eq!(store.write_stats().task_adds, 1);

    handle.stop();
    plan.register_task(child(&plan, "after stop")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(plan.new_task_ids().await.len(), 1);
}

async fn resumed_pair(
    store: &Arc<FlakyStore>,
    config: PlanConfig,
) -> (Plan, String, Vec<String>) {
    let shared: SharedStore = store.clone();
    let plan = fresh_plan(shared.clone()).await;
    let a = child(&plan, "A");
    let b = child(&plan, "B").with_predecessors([a.task_id.clone()]);
    let c = child(&plan, "C").with_predecessors([a.task_id.clone()]);
    let a_id = a.task_id.clone();
    let dependents = vec![b.task_id.clone(), c.task_id.clone()];
    plan.register_tasks(vec![a, b, c]).await.unwrap();
    plan.save().await.unwrap();
    let plan_id = plan.plan_id().to_string();
    drop(plan);

    let resumed = Plan::resume(shared, config, "agent-1", &plan_id).await.unwrap();
    (resumed, a_id, dependents)
}

#[tokio::test]
async fn test_unreadable_dependent_leaves_completion_undone() {
    let store = Arc::new(FlakyStore::new());
    let (plan, a_id, dependents) = resumed_pair(&store, PlanConfig::default()).await;
    let (b_id, c_id) = (&dependents[0], &dependents[1]);
    assert!(!plan.is_loaded(c_id).await);

    store.fail_reads(c_id);
    let err = plan.set_status(&a_id, TaskStatus::Done).await.unwrap_err();
    assert!(matches!(err, PlanError::StoreUnavailable { .. }));
    assert_eq!(plan.status_of(&a_id).await.unwrap(), TaskStatus::Ready);
    assert_eq!(plan.status_of(b_id).await.unwrap(), TaskStatus::Backlog);
    assert!(plan.modified_task_ids().await.is_empty());
    assert_eq!(plan.get_task(&a_id).await.unwrap().status, TaskStatus::Ready);

    store.heal();
    let update = plan.set_status(&a_id, TaskStatus::Done).await.unwrap();
    assert_eq!(update.promoted, dependents);
    assert_eq!(plan.status_of(b_id).await.unwrap(), TaskStatus::Ready);
    assert_eq!(plan.status_of(c_id).await.unwrap(), TaskStatus::Ready);

    plan.save().await.unwrap();
    assert_eq!(store.get_task(c_id).unwrap().status, TaskStatus::Ready);
}

#[tokio::test]
async fn test_unreadable_dependent_leaves_failure_undone() {
    let store = Arc::new(FlakyStore::new());
    let config = PlanConfig {
        failure_policy: FailurePolicy::FailDependents,
        ..PlanConfig::default()
    };
    let (plan, a_id, dependents) = resumed_pair(&store, config).await;

    store.fail_reads(&dependents[1]);
    assert!(plan.set_status(&a_id, TaskStatus::Failed).await.is_err());
    assert_eq!(plan.status_of(&a_id).await.unwrap(), TaskStatus::Ready);
    assert_eq!(plan.status_of(&dependents[0]).await.unwrap(), TaskStatus::Backlog);

    store.heal();
    let update = plan.set_status(&a_id, TaskStatus::Failed).await.unwrap();
    assert_eq!(update.failed, dependents);
}

#[tokio::test]
async fn test_parent_in_another_plan_is_rejected() {
    let (_, shared) = memory();
    let plan = fresh_plan(shared).await;
    let stray = child(&plan, "stray").with_parent(crate::models::ids::generate_plan_id());

    let err = plan.register_task(stray).await.unwrap_err();
    assert!(matches!(err, PlanError::InvariantViolation { ref reason } if reason.contains("hangs off plan")));
    assert_eq!(plan.all_task_ids().await.len(), 1);
}

#[tokio::test]
async fn test_failure_closure_reaches_every_backlog_descendant() {
    let (_, shared) = memory();
    let plan = Plan::create(
        shared,
        PlanConfig {
            failure_policy: FailurePolicy::FailDependents,
            ..PlanConfig::default()
        },
        "agent-1",
        "goal",
    )
    .await
    .unwrap();

    let mut chain = vec![child(&plan, "A")];
    for goal in ["B", "C", "D", "E"] {
        let previous = chain.last().map(|t| t.task_id.clone()).unwrap();
        chain.push(child(&plan, goal).with_predecessors([previous]));
    }
    let ids: Vec<String> = chain.iter().map(|t| t.task_id.clone()).collect();
    plan.register_tasks(chain).await.unwrap();

    let update = plan.set_status(&ids[0], TaskStatus::Failed).await.unwrap();
    assert_eq!(update.failed, ids[1..].to_vec());
}
