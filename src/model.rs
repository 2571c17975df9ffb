//! Record layer: task lifecycle operations over a storage backend.
//!
//! [`TaskModel`] owns the task entity's shape. It generates identifiers
//! and timestamps, translates create/get/update/delete/list intents into
//! [`StorageBackend`] calls, composes the minimal [`TaskPatch`] for
//! partial updates, and maps [`StorageError`]s into the
//! [`TrackerError`] taxonomy with the logical operation name attached.
//!
//! The model is store-agnostic: reserved-keyword concerns and mutation
//! dialects live in the backend adapters. It is also stateless between
//! calls -- each operation is an independent unit of work against the
//! shared backend, with no in-process locking. The read-then-write
//! sequences in [`update`](TaskModel::update) and
//! [`delete`](TaskModel::delete) are not atomic; a concurrent delete
//! between the existence check and the mutation surfaces as a store-level
//! failure, which is accepted behavior.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::TrackerError;
use crate::store::backend::{StorageBackend, StorageError, TaskPatch};
use crate::types::{now_rfc3339, TaskRecord, TaskStatus};

/// Validated fields for a new task.
///
/// Produced by the tool layer after validation; optional fields are kept
/// out of the stored record entirely when `None`.
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Trimmed task description.
    pub task: String,
    /// Initial status (`not_started` when the caller omitted it).
    pub status: TaskStatus,
    /// Estimated minutes to complete.
    pub time_to_complete: Option<u32>,
    /// RFC 3339 completion deadline.
    pub deadline: Option<String>,
    /// Candidate solutions.
    pub solutions: Option<Vec<String>>,
}

/// A validated partial update: only the fields present here are touched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    /// Replacement description.
    pub task: Option<String>,
    /// Replacement estimate in minutes.
    pub time_to_complete: Option<u32>,
    /// Replacement deadline.
    pub deadline: Option<String>,
    /// Replacement solutions list.
    pub solutions: Option<Vec<String>>,
    /// Replacement status.
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    /// Returns `true` when no field is being updated.
    pub fn is_empty(&self) -> bool {
        self.task.is_none()
            && self.time_to_complete.is_none()
            && self.deadline.is_none()
            && self.solutions.is_none()
            && self.status.is_none()
    }
}

/// Result of a successful create: the generated id, a confirmation
/// message, and the full stored record.
#[derive(Debug, Clone)]
pub struct CreatedTask {
    /// The generated task id.
    pub task_id: String,
    /// Human-readable confirmation containing the id.
    pub message: String,
    /// The record as stored.
    pub task: TaskRecord,
}

/// Result of a successful update: a confirmation message and the full
/// post-update record.
#[derive(Debug, Clone)]
pub struct UpdatedTask {
    /// Human-readable confirmation.
    pub message: String,
    /// The record after the mutation was applied.
    pub task: TaskRecord,
}

/// Result of a list operation: the matched records and their count.
#[derive(Debug, Clone)]
pub struct TaskListing {
    /// Matched records in store-native order.
    pub tasks: Vec<TaskRecord>,
    /// Number of matched records.
    pub count: usize,
}

/// Task lifecycle operations over a [`StorageBackend`].
///
/// The backend is injected at construction, so tests run against
/// [`InMemoryBackend`](crate::store::memory::InMemoryBackend) with no
/// process-environment coupling.
#[derive(Debug)]
pub struct TaskModel<B> {
    backend: B,
}

impl<B: StorageBackend> TaskModel<B> {
    /// Creates a model over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns a reference to the underlying backend.
    ///
    /// Useful for test code that needs to inspect backend state directly.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates a new task record.
    ///
    /// Generates a UUIDv4 id, stamps `created_at == updated_at == now`,
    /// merges required and present-optional fields, and writes the record
    /// unconditionally -- the id is freshly generated, so no existence
    /// check is needed.
    ///
    /// # Errors
    ///
    /// [`TrackerError::StoreWrite`] if the underlying write fails.
    pub async fn create(&self, new: NewTask) -> Result<CreatedTask, TrackerError> {
        let task_id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        let record = TaskRecord {
            id: task_id.clone(),
            created_at: now.clone(),
            updated_at: now,
            task: new.task,
            status: new.status,
            time_to_complete: new.time_to_complete,
            deadline: new.deadline,
            solutions: new.solutions,
        };

        self.backend
            .put(&record)
            .await
            .map_err(|e| TrackerError::store_write("creating task", e))?;

        tracing::debug!(task_id = %task_id, "task created");

        Ok(CreatedTask {
            message: format!("Task created successfully with ID: {task_id}"),
            task_id,
            task: record,
        })
    }

    /// Fetches a task by id.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::NotFound`] if no record exists for the id --
    ///   surfaced distinctly from store failures.
    /// - [`TrackerError::StoreRead`] on underlying access failure.
    pub async fn get(&self, task_id: &str) -> Result<TaskRecord, TrackerError> {
        match self.backend.get(task_id).await {
            Ok(record) => Ok(record),
            Err(StorageError::NotFound { .. }) => Err(TrackerError::NotFound {
                task_id: task_id.to_string(),
            }),
            Err(e) => Err(TrackerError::store_read("getting task", e)),
        }
    }

    /// Applies a partial update and returns the full post-update record.
    ///
    /// Asserts existence first (propagating [`TrackerError::NotFound`]
    /// unchanged), then builds a minimal patch containing only the fields
    /// actually supplied plus a refreshed `updated_at`, and applies it.
    /// Fields absent from the partial are never touched.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::NotFound`] if the id does not exist at the
    ///   existence check.
    /// - [`TrackerError::StoreRead`] if the existence check itself fails.
    /// - [`TrackerError::StoreWrite`] on mutation failure, including the
    ///   lost-race case where the record vanished after the check.
    pub async fn update(
        &self,
        task_id: &str,
        update: TaskUpdate,
    ) -> Result<UpdatedTask, TrackerError> {
        self.get(task_id).await?;

        let mut patch = TaskPatch::new();
        patch.set("updated_at", Value::String(now_rfc3339()));

        if let Some(task) = update.task {
            patch.set("task", Value::String(task));
        }
        if let Some(minutes) = update.time_to_complete {
            patch.set("time_to_complete", json!(minutes));
        }
        if let Some(deadline) = update.deadline {
            patch.set("deadline", Value::String(deadline));
        }
        if let Some(solutions) = update.solutions {
            patch.set("solutions", json!(solutions));
        }
        if let Some(status) = update.status {
            patch.set("status", json!(status));
        }

        let record = self
            .backend
            .update(task_id, &patch)
            .await
            .map_err(|e| TrackerError::store_write("updating task", e))?;

        tracing::debug!(task_id = %task_id, fields = patch.len(), "task updated");

        Ok(UpdatedTask {
            message: "Task updated successfully".to_string(),
            task: record,
        })
    }

    /// Deletes a task after confirming it exists.
    ///
    /// Returns a confirmation message including the id. Deletion is
    /// irreversible.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::NotFound`] if the id does not exist.
    /// - [`TrackerError::StoreRead`] if the existence check fails.
    /// - [`TrackerError::StoreWrite`] on underlying delete failure.
    pub async fn delete(&self, task_id: &str) -> Result<String, TrackerError> {
        self.get(task_id).await?;

        self.backend
            .delete(task_id)
            .await
            .map_err(|e| TrackerError::store_write("deleting task", e))?;

        tracing::debug!(task_id = %task_id, "task deleted");

        Ok(format!("Task deleted successfully: {task_id}"))
    }

    /// Lists up to `limit` tasks, optionally filtered by status equality.
    ///
    /// A bounded full scan; no ordering guarantee beyond store-native
    /// order.
    ///
    /// # Errors
    ///
    /// [`TrackerError::StoreRead`] on scan failure.
    pub async fn list(
        &self,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> Result<TaskListing, TrackerError> {
        let tasks = self
            .backend
            .scan(status, limit)
            .await
            .map_err(|e| TrackerError::store_read("listing tasks", e))?;

        let count = tasks.len();
        Ok(TaskListing { tasks, count })
    }
}
