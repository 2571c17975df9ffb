//! Process configuration for the server binary.
//!
//! Configuration is read once at startup and passed explicitly into
//! backend construction. The record layer never reads ambient process
//! state, so tests can inject an in-memory backend with no environment
//! coupling.

use std::env;

/// Name of the environment variable holding the DynamoDB table name.
pub const TABLE_NAME_VAR: &str = "TASK_TABLE_NAME";

const DEFAULT_TABLE_NAME: &str = "TaskTable";

/// Startup configuration for the task tracker.
///
/// # Examples
///
/// ```
/// use task_tracker_mcp::TrackerConfig;
///
/// let config = TrackerConfig::default();
/// assert_eq!(config.table_name, "TaskTable");
/// ```
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Name of the table holding task records.
    pub table_name: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Reads configuration from the process environment, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            table_name: env::var(TABLE_NAME_VAR)
                .unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string()),
        }
    }
}
