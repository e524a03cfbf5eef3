//! In-memory task store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TaskStore;
use crate::domain::Task;
use crate::error::GatewayError;

/// Task store backed by a process-local map.
///
/// Used when `PERSISTENCE_ENABLED=false`; all tasks are lost on
/// restart. Identifiers come from a monotonically increasing counter
/// starting at 1, and iteration follows identifier order.
#[derive(Debug)]
pub struct InMemoryTaskStore {
    tasks: RwLock<BTreeMap<i32, Task>>,
    next_id: AtomicI32,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list(&self) -> Result<Vec<Task>, GatewayError> {
        let map = self.tasks.read().await;
        Ok(map.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Task>, GatewayError> {
        let map = self.tasks.read().await;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, mut task: Task) -> Result<Task, GatewayError> {
        task.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut map = self.tasks.write().await;
        map.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, task: &Task) -> Result<bool, GatewayError> {
        let mut map = self.tasks.write().await;
        match map.get_mut(&task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, GatewayError> {
        let mut map = self.tasks.write().await;
        Ok(map.remove(&id).is_some())
    }
}
