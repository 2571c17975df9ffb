//! Error types for task tracker operations.
//!
//! [`TrackerError`] is the single tagged error type used across the record
//! and tool layers. Each variant carries the context needed to build a
//! failure envelope, and the `Display` text is what callers see verbatim
//! in the envelope's `error` field.

use thiserror::Error;

use crate::store::StorageError;

/// Errors that can occur during task operations.
///
/// Four kinds, matching where the failure originated:
///
/// - [`Validation`](Self::Validation) -- input failed schema or
///   business-rule checks; raised before any store access.
/// - [`NotFound`](Self::NotFound) -- the referenced task id does not exist.
/// - [`StoreRead`](Self::StoreRead) / [`StoreWrite`](Self::StoreWrite) --
///   the underlying store operation failed; wraps the original failure
///   reason together with the logical operation that was in flight, so
///   "task missing" and "store unavailable" stay distinguishable.
///
/// # Examples
///
/// ```
/// use task_tracker_mcp::TrackerError;
///
/// let err = TrackerError::NotFound { task_id: "abc".to_string() };
/// assert_eq!(err.to_string(), "Task not found with ID: abc");
///
/// let err = TrackerError::validation("Deadline must be in the future");
/// assert_eq!(err.to_string(), "Deadline must be in the future");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// Input failed schema or business-rule validation. Always recoverable
    /// by resubmitting corrected input; never touches the store.
    #[error("{message}")]
    Validation {
        /// Human-readable description of the rejected input.
        message: String,
    },

    /// No task exists for the referenced id.
    #[error("Task not found with ID: {task_id}")]
    NotFound {
        /// The id that was not found.
        task_id: String,
    },

    /// An underlying store read (get or scan) failed.
    #[error("Error {operation}: {reason}")]
    StoreRead {
        /// The logical operation in flight, e.g. `"getting task"`.
        operation: String,
        /// The original failure reason from the store.
        reason: String,
    },

    /// An underlying store mutation (put, update, or delete) failed.
    #[error("Error {operation}: {reason}")]
    StoreWrite {
        /// The logical operation in flight, e.g. `"creating task"`.
        operation: String,
        /// The original failure reason from the store.
        reason: String,
    },
}

impl TrackerError {
    /// Builds a validation error from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wraps a storage failure that occurred during a read.
    pub(crate) fn store_read(operation: &str, err: StorageError) -> Self {
        Self::StoreRead {
            operation: operation.to_string(),
            reason: err.to_string(),
        }
    }

    /// Wraps a storage failure that occurred during a mutation.
    pub(crate) fn store_write(operation: &str, err: StorageError) -> Self {
        Self::StoreWrite {
            operation: operation.to_string(),
            reason: err.to_string(),
        }
    }

    /// Returns `true` for validation failures, which are rejected before
    /// any store access.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
