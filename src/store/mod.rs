//! Keyed storage backends for task records.
//!
//! # Architecture
//!
//! Storage is split in two:
//!
//! 1. **[`StorageBackend`]** -- a dumb keyed-store trait with five
//!    primitives (`get`, `put`, `update`, `delete`, `scan`). Backends hold
//!    no domain logic; they store and retrieve [`TaskRecord`]s by id and
//!    translate a [`TaskPatch`] into their native mutation syntax.
//!
//! 2. **[`TaskModel`](crate::model::TaskModel)** -- the record layer on
//!    top. Generates ids and timestamps, composes minimal patches, and maps
//!    [`StorageError`] into the domain error taxonomy.
//!
//! # Backends
//!
//! - [`InMemoryBackend`](memory::InMemoryBackend) -- thread-safe in-memory
//!   backend using `DashMap`. Always compiled; used by tests and local runs.
//! - [`DynamoDbBackend`](dynamodb::DynamoDbBackend) -- DynamoDB adapter for
//!   production deployments, behind the `dynamodb` feature flag. Reserved
//!   attribute-name aliasing lives entirely inside this adapter.
//!
//! [`TaskRecord`]: crate::types::TaskRecord

pub mod backend;
#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod memory;

pub use backend::{StorageBackend, StorageError, TaskPatch};
