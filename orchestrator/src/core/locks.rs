//! Per-task mutual exclusion
//!
//! Every read-modify-write of a task record happens while holding that
//! task's guard, so racing completion pings and abort requests apply one
//! at a time and a terminal status is never overwritten by a stale copy.
//!
//! A task's entry lives only while some caller holds or waits for its
//! guard. Requests naming unknown or failed tasks leave nothing behind.

use shared::TaskId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

type Registry = HashMap<TaskId, Arc<Mutex<()>>>;

/// Lazily created async mutex per task id
#[derive(Debug, Default)]
pub struct TaskLocks {
    locks: StdMutex<Registry>,
}

/// Exclusive access to one task; releasing the last guard of a task
/// removes its entry
#[derive(Debug)]
pub struct TaskGuard<'a> {
    task_id: TaskId,
    registry: &'a StdMutex<Registry>,
    held: Option<OwnedMutexGuard<()>>,
}

impl TaskLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a task
    pub async fn acquire(&self, task_id: &TaskId) -> TaskGuard<'_> {
        let lock = {
            let mut locks = lock_registry(&self.locks);
            locks.entry(task_id.clone()).or_default().clone()
        };
        TaskGuard {
            task_id: task_id.clone(),
            registry: &self.locks,
            held: Some(lock.lock_owned().await),
        }
    }

    /// Number of tasks with a lock entry
    pub fn tracked(&self) -> usize {
        lock_registry(&self.locks).len()
    }
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        drop(self.held.take());
        let mut locks = lock_registry(self.registry);
        // Waiters hold a clone of the Arc; only the map's copy means idle
        if locks
            .get(&self.task_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.task_id);
        }
    }
}

// The map is never left half-updated, so a poisoned lock is still usable
fn lock_registry(registry: &StdMutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
