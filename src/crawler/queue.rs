//! FIFO task queue with visited-set deduplication and a request budget
//!
//! Breadth-first ordering: newly discovered pagination and directive tasks
//! go to the tail, so directly-seeded, low-page-number candidates are
//! processed first. The budget bounds total issued requests against a
//! misbehaving or very large listing; hitting it is normal termination.

use crate::crawler::task::Task;
use std::collections::{HashSet, VecDeque};

/// Floor for the request budget, whatever the seed count
const MIN_REQUEST_BUDGET: usize = 80;

pub struct TaskQueue {
    queue: VecDeque<Task>,
    visited: HashSet<Task>,
    issued: usize,
    budget: usize,
}

impl TaskQueue {
    /// Creates a queue from the seeded frontier
    ///
    /// The budget is `max(80, 2 × seed count)`, measured before any
    /// visited-set deduplication.
    pub fn from_seeds(seeds: Vec<Task>) -> Self {
        let budget = MIN_REQUEST_BUDGET.max(seeds.len() * 2);
        TaskQueue {
            queue: seeds.into(),
            visited: HashSet::new(),
            issued: 0,
            budget,
        }
    }

    /// Appends a discovered task at the tail
    pub fn push(&mut self, task: Task) {
        tracing::debug!("Queue+ {} {}", task.method, task.url);
        self.queue.push_back(task);
    }

    /// Pops the next task that has not been issued yet
    ///
    /// Marks the returned task as visited. Returns `None` once the queue is
    /// empty or the budget is exhausted.
    pub fn next(&mut self) -> Option<Task> {
        while self.issued < self.budget {
            let task = self.queue.pop_front()?;
            if !self.visited.insert(task.clone()) {
                tracing::debug!("Queue~ skipping visited {} {}", task.method, task.url);
                continue;
            }
            self.issued += 1;
            return Some(task);
        }
        None
    }

    /// Number of requests issued so far
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Number of tasks still waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Total request budget for this crawl
    pub fn budget(&self) -> usize {
        self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> Task {
        Task::get(url)
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = TaskQueue::from_seeds(vec![get("https://a"), get("https://b")]);
        queue.push(get("https://c"));
        assert_eq!(queue.next().unwrap().url, "https://a");
        assert_eq!(queue.next().unwrap().url, "https://b");
        assert_eq!(queue.next().unwrap().url, "https://c");
        assert!(queue.next().is_none());
    }

    #[test]
    fn test_duplicate_task_issued_once() {
        let mut queue = TaskQueue::from_seeds(vec![get("https://a"), get("https://a")]);
        queue.push(get("https://a"));
        assert!(queue.next().is_some());
        assert!(queue.next().is_none());
        assert_eq!(queue.issued(), 1);
    }

    #[test]
    fn test_budget_floor() {
        let queue = TaskQueue::from_seeds(vec![get("https://a")]);
        assert_eq!(queue.budget(), 80);
    }

    #[test]
    fn test_budget_scales_with_seeds() {
        let seeds: Vec<Task> = (0..50).map(|i| get(&format!("https://s/{}", i))).collect();
        let queue = TaskQueue::from_seeds(seeds);
        assert_eq!(queue.budget(), 100);
    }

    #[test]
    fn test_budget_caps_issued_requests() {
        let seeds: Vec<Task> = (0..50).map(|i| get(&format!("https://s/{}", i))).collect();
        let mut queue = TaskQueue::from_seeds(seeds);
        let mut issued = 0;
        while let Some(task) = queue.next() {
            issued += 1;
            // Every response discovers two fresh follow-ups
            queue.push(get(&format!("{}/x", task.url)));
            queue.push(get(&format!("{}/y", task.url)));
        }
        assert_eq!(issued, 100);
        assert!(queue.pending() > 0);
    }
}
