//! Task tracker MCP server.
//!
//! Exposes a small task-tracking resource (create/read/update/delete/list)
//! as MCP tools, backed by a pluggable keyed store.
//!
//! # Architecture
//!
//! Three layers, each depending only on the one below:
//!
//! - [`tools`] -- the five callable operations (`create_task`, `get_task`,
//!   `update_task`, `delete_task`, `list_tasks`), their declared input
//!   contracts, handler-side validation (including the future-deadline
//!   business rule), and the uniform success/failure envelope.
//! - [`model`] -- the record layer: id and timestamp generation, minimal
//!   partial-update composition, and translation of intents into store
//!   primitives.
//! - [`store`] -- the keyed storage trait with in-memory and DynamoDB
//!   (feature `dynamodb`) adapters. Store-dialect concerns such as
//!   reserved-word aliasing live here and nowhere else.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use task_tracker_mcp::store::memory::InMemoryBackend;
//! use task_tracker_mcp::tools::build_server;
//! use task_tracker_mcp::TaskModel;
//!
//! let model = Arc::new(TaskModel::new(InMemoryBackend::new()));
//! let server = build_server(model).expect("server builds");
//! # let _ = server;
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod tools;
pub mod types;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use model::{NewTask, TaskModel, TaskUpdate};
pub use types::{TaskRecord, TaskStatus};
