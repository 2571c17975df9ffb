//! In-memory storage backend.
//!
//! [`InMemoryBackend`] provides a thread-safe [`StorageBackend`]
//! implementation using `DashMap<String, TaskRecord>` keyed by task id.
//! It is the default backend for local runs and the test suite.
//!
//! Partial updates are applied by round-tripping the stored record through
//! its JSON object form: patch fields are merged into the object and the
//! result is deserialized back into a typed record. This keeps the merge
//! semantics identical to what a JSON-document store would do.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::store::backend::{StorageBackend, StorageError, TaskPatch};
use crate::types::{TaskRecord, TaskStatus};

/// Thread-safe in-memory storage backend using [`DashMap`].
///
/// Contains no domain logic. Scan order follows the map's internal shard
/// order, which satisfies the "store-native order" contract.
///
/// # Examples
///
/// ```
/// use task_tracker_mcp::store::memory::InMemoryBackend;
///
/// let backend = InMemoryBackend::new();
/// assert!(backend.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: DashMap<String, TaskRecord>,
}

impl InMemoryBackend {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Returns the number of records stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the backend contains no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Merges the patch fields into the record via its JSON object form.
fn apply_patch(record: &TaskRecord, patch: &TaskPatch) -> Result<TaskRecord, StorageError> {
    let mut object = match serde_json::to_value(record) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(_) => {
            return Err(StorageError::Backend {
                message: "record did not serialize to an object".to_string(),
                source: None,
            })
        },
        Err(e) => {
            return Err(StorageError::Backend {
                message: format!("failed to serialize record: {e}"),
                source: Some(Box::new(e)),
            })
        },
    };

    for (field, value) in patch.entries() {
        object.insert(field.clone(), value.clone());
    }

    serde_json::from_value(serde_json::Value::Object(object)).map_err(|e| StorageError::Backend {
        message: format!("failed to apply patch: {e}"),
        source: Some(Box::new(e)),
    })
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn get(&self, id: &str) -> Result<TaskRecord, StorageError> {
        let entry = self.data.get(id).ok_or_else(|| StorageError::NotFound {
            key: id.to_string(),
        })?;
        Ok(entry.value().clone())
    }

    async fn put(&self, record: &TaskRecord) -> Result<(), StorageError> {
        self.data.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<TaskRecord, StorageError> {
        let mut entry = self
            .data
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound {
                key: id.to_string(),
            })?;
        let merged = apply_patch(entry.value(), patch)?;
        *entry.value_mut() = merged.clone();
        Ok(merged)
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.data.remove(id);
        Ok(())
    }

    async fn scan(
        &self,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> Result<Vec<TaskRecord>, StorageError> {
        let tasks: Vec<TaskRecord> = self
            .data
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|record| status.is_none_or(|s| record.status == s))
            .take(limit)
            .collect();
        Ok(tasks)
    }
}
