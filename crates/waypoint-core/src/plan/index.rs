//! Id indices and the readiness graph.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    error::{PlanError, Result},
    models::{ids::is_plan_id, Schedulable, Task, TaskStatus},
};

/// Insertion-ordered set of ids with constant-time membership checks.
#[derive(Debug, Clone, Default)]
pub struct OrderedIdSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl OrderedIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` unless present. Returns whether it was added.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.members.contains(id) {
            return false;
        }
        self.members.insert(id.to_string());
        self.order.push(id.to_string());
        true
    }

    /// Removes `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|member| member != id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn first(&self) -> Option<&str> {
        self.order.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }
}

impl<'a> FromIterator<&'a str> for OrderedIdSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// The scheduling-relevant projection of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskNode {
    pub status: TaskStatus,
    pub parent_id: Option<String>,
    pub predecessor_ids: Vec<String>,
}

impl TaskNode {
    pub fn of<S: Schedulable>(item: &S) -> Self {
        Self {
            status: item.status(),
            parent_id: item.parent_id().map(String::from),
            predecessor_ids: item.predecessor_ids().to_vec(),
        }
    }
}

/// Status, parent and predecessor edges of every task in a plan, whether or
/// not the task itself is loaded.
#[derive(Debug, Default)]
pub(crate) struct ReadinessIndex {
    nodes: HashMap<String, TaskNode>,
    dependents: HashMap<String, Vec<String>>,
}

impl ReadinessIndex {
    pub fn insert(&mut self, id: &str, node: TaskNode) {
        for predecessor in &node.predecessor_ids {
            let dependents = self.dependents.entry(predecessor.clone()).or_default();
            if !dependents.iter().any(|d| d == id) {
                dependents.push(id.to_string());
            }
        }
        self.nodes.insert(id.to_string(), node);
    }

    pub fn get(&self, id: &str) -> Option<&TaskNode> {
        self.nodes.get(id)
    }

    pub fn status(&self, id: &str) -> Option<TaskStatus> {
        self.nodes.get(id).map(|node| node.status)
    }

    pub fn set_status(&mut self, id: &str, status: TaskStatus) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.status = status;
        }
    }

    /// True when every predecessor of `id` is known and done. A task without
    /// predecessors is trivially unblocked.
    pub fn predecessors_done(&self, id: &str) -> bool {
        self.nodes.get(id).map_or(false, |node| {
            node.predecessor_ids
                .iter()
                .all(|p| self.status(p) == Some(TaskStatus::Done))
        })
    }

    /// Backlog dependents that become unblocked once `id` is done. Reads
    /// `id` as done whatever its recorded status, so the set can be computed
    /// before the status is applied.
    pub fn promotable_dependents(&self, id: &str) -> Vec<String> {
        self.dependents
            .get(id)
            .into_iter()
            .flatten()
            .filter(|dependent| self.status(dependent) == Some(TaskStatus::Backlog))
            .filter(|dependent| {
                self.nodes.get(dependent.as_str()).map_or(false, |node| {
                    node.predecessor_ids
                        .iter()
                        .all(|p| p == id || self.status(p) == Some(TaskStatus::Done))
                })
            })
            .cloned()
            .collect()
    }

    /// Every backlog task that transitively waits on `id`, breadth first.
    pub fn backlog_dependents_closure(&self, id: &str) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([id]);
        let mut out = Vec::new();

        while let Some(current) = queue.pop_front() {
            for dependent in self.dependents.get(current).into_iter().flatten() {
                if self.status(dependent) != Some(TaskStatus::Backlog) {
                    continue;
                }
                if seen.insert(dependent.as_str()) {
                    out.push(dependent.clone());
                    queue.push_back(dependent.as_str());
                }
            }
        }
        out
    }

    /// Checks a registration batch against the plan.
    ///
    /// Rejects foreign tasks, self-dependencies, unknown predecessors or
    /// parents, and any cycle in the union of predecessor edges and
    /// parent-to-child edges (a parent waits for its children).
    pub fn validate_batch(&self, plan_id: &str, batch: &[Task]) -> Result<()> {
        let batch_ids: HashSet<&str> = batch.iter().map(|t| t.task_id.as_str()).collect();
        let known = |id: &str| self.nodes.contains_key(id) || batch_ids.contains(id);

        for task in batch {
            if task.plan_id != plan_id {
                return Err(PlanError::invariant(format!(
                    "task {} belongs to plan {}, not {plan_id}",
                    task.task_id, task.plan_id
                )));
            }
            if task.predecessor_ids.iter().any(|p| p == &task.task_id) {
                return Err(PlanError::invariant(format!(
                    "task {} lists itself as a predecessor",
                    task.task_id
                )));
            }
            if let Some(missing) = task.predecessor_ids.iter().find(|p| !known(p)) {
                return Err(PlanError::invariant(format!(
                    "task {} depends on {missing}, which is not part of plan {plan_id}",
                    task.task_id
                )));
            }
            if let Some(parent) = &task.parent_id {
                if parent == &task.task_id {
                    return Err(PlanError::invariant(format!(
                        "task {} is its own parent",
                        task.task_id
                    )));
                }
                if parent != plan_id && is_plan_id(parent) {
                    return Err(PlanError::invariant(format!(
                        "task {} hangs off plan {parent}, not {plan_id}",
                        task.task_id
                    )));
                }
                if parent != plan_id && !known(parent) {
                    return Err(PlanError::invariant(format!(
                        "task {} has parent {parent}, which is not part of plan {plan_id}",
                        task.task_id
                    )));
                }
            }
        }

        self.check_acyclic(batch)
    }

    fn check_acyclic(&self, batch: &[Task]) -> Result<()> {
        // Edges point from a task to what it waits on.
        let mut waits_on: HashMap<&str, Vec<&str>> = HashMap::new();
        let existing = self.nodes.iter().map(|(id, node)| {
            (
                id.as_str(),
                node.parent_id.as_deref(),
                node.predecessor_ids.as_slice(),
            )
        });
        let incoming = batch.iter().map(|task| {
            (
                task.task_id.as_str(),
                task.parent_id.as_deref(),
                task.predecessor_ids.as_slice(),
            )
        });
        for (id, parent, predecessors) in existing.chain(incoming) {
            waits_on
                .entry(id)
                .or_default()
                .extend(predecessors.iter().map(String::as_str));
            if let Some(parent) = parent {
                waits_on.entry(parent).or_default().push(id);
            }
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Finished,
        }

        // Only batch members can close a new cycle; the existing graph is acyclic.
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        for start in batch.iter().map(|t| t.task_id.as_str()) {
            if marks.contains_key(start) {
                continue;
            }
            let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
            marks.insert(start, Mark::Visiting);

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                let edges = waits_on.get(node).map(Vec::as_slice).unwrap_or(&[]);
                if next >= edges.len() {
                    marks.insert(node, Mark::Finished);
                    stack.pop();
                    continue;
                }
                frame.1 += 1;

                let target = edges[next];
                match marks.get(target) {
                    Some(Mark::Visiting) => {
                        let mut path: Vec<&str> = stack.iter().map(|(id, _)| *id).collect();
                        let from = path.iter().position(|id| *id == target).unwrap_or(0);
                        path.drain(..from);
                        path.push(target);
                        return Err(PlanError::invariant(format!(
                            "dependency cycle: {}",
                            path.join(" → ")
                        )));
                    }
                    Some(Mark::Finished) => {}
                    None => {
                        marks.insert(target, Mark::Visiting);
                        stack.push((target, 0));
                    }
                }
            }
        }
        Ok(())
    }
}
