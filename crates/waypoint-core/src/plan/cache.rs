use std::collections::{HashMap, VecDeque};

use crate::models::Task;

/// Bounded least-recently-used cache of loaded tasks.
///
/// Entries the caller reports as pinned are skipped by eviction, so the
/// cache may exceed its capacity while many tasks are dirty.
#[derive(Debug)]
pub(crate) struct TaskCache {
    capacity: usize,
    entries: HashMap<String, Task>,
    recency: VecDeque<String>,
}

impl TaskCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            recency: VecDeque::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&mut self, id: &str) -> Option<&Task> {
        if self.entries.contains_key(id) {
            self.touch(id);
        }
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        if self.entries.contains_key(id) {
            self.touch(id);
        }
        self.entries.get_mut(id)
    }

    /// Inserts or replaces `task`, then evicts the least recently used
    /// unpinned entries until the cache fits again.
    pub fn insert(&mut self, task: Task, pinned: impl Fn(&str) -> bool) {
        let id = task.task_id.clone();
        self.entries.insert(id.clone(), task);
        self.touch(&id);

        let mut idx = 0;
        while self.entries.len() > self.capacity && idx < self.recency.len() {
            let candidate = &self.recency[idx];
            if *candidate == id || pinned(candidate.as_str()) {
                idx += 1;
                continue;
            }
            if let Some(evicted) = self.recency.remove(idx) {
                log::trace!("Evicting task {evicted} from cache");
                self.entries.remove(&evicted);
            }
        }
    }

    fn touch(&mut self, id: &str) {
        if let Some(pos) = self.recency.iter().position(|entry| entry == id) {
            self.recency.remove(pos);
        }
        self.recency.push_back(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = TaskCache::new(2);
        let a = Task::new("PL-1", "a");
        let b = Task::new("PL-1", "b");
        let c = Task::new("PL-1", "c");

        cache.insert(a.clone(), |_| false);
        cache.insert(b.clone(), |_| false);
        assert!(cache.get(&a.task_id).is_some());
        cache.insert(c.clone(), |_| false);

        assert!(cache.contains(&a.task_id));
        assert!(!cache.contains(&b.task_id));
        assert!(cache.contains(&c.task_id));
    }

    #[test]
    fn test_pinned_entries_survive_over_capacity() {
        let mut cache = TaskCache::new(1);
        let a = Task::new("PL-1", "a");
        let b = Task::new("PL-1", "b");
        let pinned = a.task_id.clone();

        cache.insert(a.clone(), |id| id == pinned);
        cache.insert(b.clone(), |id| id == pinned);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&a.task_id));
        assert!(cache.contains(&b.task_id));
    }
}
