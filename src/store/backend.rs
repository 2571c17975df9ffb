//! Low-level keyed storage trait and supporting types.
//!
//! The [`StorageBackend`] trait defines the contract every storage engine
//! implements. It exposes 5 operations keyed by task id:
//! [`get`](StorageBackend::get), [`put`](StorageBackend::put),
//! [`update`](StorageBackend::update), [`delete`](StorageBackend::delete),
//! and [`scan`](StorageBackend::scan).
//!
//! Domain logic (id generation, timestamping, patch composition, error
//! taxonomy) does **not** belong here. Backends are dumb keyed stores;
//! domain logic lives in [`TaskModel`](crate::model::TaskModel).
//!
//! # Partial updates
//!
//! A partial update travels as a [`TaskPatch`] -- an ordered mapping from
//! field name to new JSON value, containing exactly the fields being
//! changed. Each backend translates the patch into whatever mutation
//! syntax its store dialect requires; any reserved-keyword aliasing the
//! dialect needs is applied inside the backend and only for the fields
//! actually present in the patch.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::{TaskRecord, TaskStatus};

/// An ordered mapping of field name to new value -- the wire-agnostic form
/// of a partial update.
///
/// Constructed by the record layer with exactly the fields being changed
/// (plus the refreshed `updated_at`); fields absent from the patch must
/// never be touched by the backend. Insertion order is preserved so the
/// resulting mutation is deterministic.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use task_tracker_mcp::store::TaskPatch;
///
/// let mut patch = TaskPatch::new();
/// patch.set("updated_at", json!("2026-08-05T12:00:00.000Z"));
/// patch.set("status", json!("done"));
///
/// assert_eq!(patch.len(), 2);
/// assert!(patch.contains("status"));
/// assert!(!patch.contains("task"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    fields: Map<String, Value>,
}

impl TaskPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Sets a field to a new value. A repeated `set` for the same field
    /// replaces the earlier value.
    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    /// Returns `true` if the patch names the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields in the patch.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the patch contains no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates the `(field, value)` entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

/// Errors that can occur during raw storage operations.
///
/// These are low-level errors. The record layer maps them to
/// [`TrackerError`](crate::error::TrackerError) variants before surfacing
/// to callers, preserving the `Display` text as the failure reason.
#[derive(Debug)]
pub enum StorageError {
    /// The requested key was not found in storage.
    NotFound {
        /// The key that was not found.
        key: String,
    },

    /// An I/O or backend-specific error occurred (e.g., network failure,
    /// throttling, malformed query).
    Backend {
        /// Human-readable description of the error.
        message: String,
        /// The underlying error, if available. Accessible via
        /// [`std::error::Error::source()`].
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { key } => write!(f, "key not found: {key}"),
            Self::Backend { message, .. } => write!(f, "backend error: {message}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend {
                source: Some(src), ..
            } => Some(src.as_ref()),
            _ => None,
        }
    }
}

/// Keyed storage backend for task persistence.
///
/// Implementations provide raw storage primitives over a single logical
/// table keyed by task id. All domain logic lives in
/// [`TaskModel`](crate::model::TaskModel), **not** in the backend.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to support concurrent access from
/// multiple request handlers.
///
/// # Atomicity
///
/// Each primitive is individually atomic per key; no cross-call locking or
/// conditional writes are provided. The read-then-write sequences the
/// record layer performs are therefore not transactional -- a concurrent
/// delete between an existence check and an [`update`](Self::update) makes
/// the update fail with [`StorageError::NotFound`], which is the accepted
/// behavior.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Retrieves a record by id.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if no record exists for the id.
    /// - [`StorageError::Backend`] on I/O or backend-specific failures.
    async fn get(&self, id: &str) -> Result<TaskRecord, StorageError>;

    /// Stores a record unconditionally (create or overwrite).
    ///
    /// # Errors
    ///
    /// - [`StorageError::Backend`] on I/O or backend-specific failures.
    async fn put(&self, record: &TaskRecord) -> Result<(), StorageError>;

    /// Applies a partial update and returns the full post-update record.
    ///
    /// Exactly the fields named in `patch` change; everything else keeps
    /// its prior value.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if no record exists for the id.
    /// - [`StorageError::Backend`] on I/O or backend-specific failures.
    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<TaskRecord, StorageError>;

    /// Deletes a record by id unconditionally.
    ///
    /// Deleting an absent key is not an error (idempotent delete); the
    /// record layer checks existence first when a distinct not-found
    /// outcome is required.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Backend`] on I/O or backend-specific failures.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;

    /// Enumerates up to `limit` records, optionally filtered by status
    /// equality.
    ///
    /// Results come back in store-native order; no secondary sort is
    /// applied.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Backend`] on I/O or backend-specific failures.
    async fn scan(
        &self,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> Result<Vec<TaskRecord>, StorageError>;
}
