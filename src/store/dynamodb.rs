//! DynamoDB storage backend for task persistence.
//!
//! [`DynamoDbBackend`] implements [`StorageBackend`] using Amazon DynamoDB
//! as the underlying keyed store. It maps the 5 trait methods to DynamoDB
//! API calls: `GetItem`, `PutItem`, `UpdateItem` (with a conditionally
//! built `UpdateExpression`), `DeleteItem`, and `Scan` (with an optional
//! `FilterExpression`).
//!
//! # Table Layout
//!
//! All task records live in a single table keyed by `id` (String partition
//! key, no sort key), with one attribute per record field:
//!
//! | Attribute          | Type   | Presence |
//! |--------------------|--------|----------|
//! | `id`               | String | always   |
//! | `created_at`       | String | always   |
//! | `updated_at`       | String | always   |
//! | `task`             | String | always   |
//! | `status`           | String | always   |
//! | `time_to_complete` | Number | optional |
//! | `deadline`         | String | optional |
//! | `solutions`        | List   | optional |
//!
//! # Reserved-Word Aliasing
//!
//! `task` and `status` are reserved words in DynamoDB expressions, so the
//! update and filter expressions reference them through
//! `ExpressionAttributeNames` (`#task_name`, `#status_name`). The alias map
//! is attached to a request only when one of those fields is actually
//! present in the patch; mutations that touch neither field carry no alias
//! declarations. This concern lives entirely inside this adapter -- the
//! record layer only ever sees plain field names.
//!
//! # Usage
//!
//! ```rust,no_run
//! use task_tracker_mcp::store::dynamodb::DynamoDbBackend;
//! use task_tracker_mcp::TaskModel;
//!
//! # async fn example() {
//! // From environment (standard AWS config chain):
//! let backend = DynamoDbBackend::from_env_with_table("TaskTable").await;
//! let model = TaskModel::new(backend);
//!
//! // With a pre-built client:
//! let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
//! let client = aws_sdk_dynamodb::Client::new(&config);
//! let backend = DynamoDbBackend::new(client, "TaskTable");
//! let model = TaskModel::new(backend);
//! # }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use serde_json::Value;

use crate::store::backend::{StorageBackend, StorageError, TaskPatch};
use crate::types::{TaskRecord, TaskStatus};

/// DynamoDB storage backend for task persistence.
///
/// A thin adapter with **no domain logic**: it stores one attribute per
/// record field and translates [`TaskPatch`] mappings into conditionally
/// built `UpdateExpression`s (see the module docs for the aliasing rules).
#[derive(Debug, Clone)]
pub struct DynamoDbBackend {
    client: Client,
    table_name: String,
}

impl DynamoDbBackend {
    /// Creates a backend with a pre-built DynamoDB client.
    ///
    /// The table must already exist with `id` (String) as its partition
    /// key; no sort key and no secondary indexes are required.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a backend from the standard AWS SDK config chain with the
    /// given table name.
    ///
    /// Loads credentials and region from environment variables, AWS
    /// profiles, or IMDS (for EC2/Lambda).
    pub async fn from_env_with_table(table_name: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);
        Self::new(client, table_name)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Maps an AWS SDK error to a [`StorageError::Backend`].
fn map_sdk_error(err: impl std::error::Error + Send + Sync + 'static, key: &str) -> StorageError {
    StorageError::Backend {
        message: format!("DynamoDB error for key {key}: {err}"),
        source: Some(Box::new(err)),
    }
}

fn missing_attribute(attr: &str) -> StorageError {
    StorageError::Backend {
        message: format!("missing or invalid {attr} attribute"),
        source: None,
    }
}

/// Converts a patch value into its DynamoDB attribute form.
///
/// Task patches only ever carry strings (`task`, `status`, `deadline`,
/// `updated_at`), numbers (`time_to_complete`), and string lists
/// (`solutions`); anything else is a malformed patch.
fn json_to_attr(value: &Value) -> Result<AttributeValue, StorageError> {
    match value {
        Value::String(s) => Ok(AttributeValue::S(s.clone())),
        Value::Number(n) => Ok(AttributeValue::N(n.to_string())),
        Value::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => list.push(AttributeValue::S(s.clone())),
                    other => {
                        return Err(StorageError::Backend {
                            message: format!("unsupported list element in patch: {other}"),
                            source: None,
                        })
                    },
                }
            }
            Ok(AttributeValue::L(list))
        },
        other => Err(StorageError::Backend {
            message: format!("unsupported patch value: {other}"),
            source: None,
        }),
    }
}

/// Builds the `SET` update expression for a patch.
///
/// Returns the expression string, the alias map (`None` when neither
/// reserved field is present, so the request carries no unused alias
/// declarations), and the placeholder-to-value map.
fn build_update_expression(
    patch: &TaskPatch,
) -> Result<
    (
        String,
        Option<HashMap<String, String>>,
        HashMap<String, AttributeValue>,
    ),
    StorageError,
> {
    let mut parts = Vec::with_capacity(patch.len());
    let mut names: HashMap<String, String> = HashMap::new();
    let mut values: HashMap<String, AttributeValue> = HashMap::new();

    for (field, value) in patch.entries() {
        let placeholder = format!(":{field}");
        match field.as_str() {
            "task" => {
                parts.push("#task_name = :task".to_string());
                names.insert("#task_name".to_string(), "task".to_string());
            },
            "status" => {
                parts.push("#status_name = :status".to_string());
                names.insert("#status_name".to_string(), "status".to_string());
            },
            _ => parts.push(format!("{field} = {placeholder}")),
        }
        values.insert(placeholder, json_to_attr(value)?);
    }

    let names = if names.is_empty() { None } else { Some(names) };
    Ok((format!("SET {}", parts.join(", ")), names, values))
}

fn record_to_item(record: &TaskRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("id".to_string(), AttributeValue::S(record.id.clone()));
    item.insert(
        "created_at".to_string(),
        AttributeValue::S(record.created_at.clone()),
    );
    item.insert(
        "updated_at".to_string(),
        AttributeValue::S(record.updated_at.clone()),
    );
    item.insert("task".to_string(), AttributeValue::S(record.task.clone()));
    item.insert(
        "status".to_string(),
        AttributeValue::S(record.status.to_string()),
    );
    if let Some(minutes) = record.time_to_complete {
        item.insert(
            "time_to_complete".to_string(),
            AttributeValue::N(minutes.to_string()),
        );
    }
    if let Some(deadline) = &record.deadline {
        item.insert("deadline".to_string(), AttributeValue::S(deadline.clone()));
    }
    if let Some(solutions) = &record.solutions {
        item.insert(
            "solutions".to_string(),
            AttributeValue::L(
                solutions
                    .iter()
                    .map(|s| AttributeValue::S(s.clone()))
                    .collect(),
            ),
        );
    }
    item
}

fn get_s<'a>(
    item: &'a HashMap<String, AttributeValue>,
    attr: &str,
) -> Result<&'a str, StorageError> {
    item.get(attr)
        .and_then(|v| v.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| missing_attribute(attr))
}

fn item_to_record(item: &HashMap<String, AttributeValue>) -> Result<TaskRecord, StorageError> {
    let status: TaskStatus = get_s(item, "status")?
        .parse()
        .map_err(|e: String| StorageError::Backend {
            message: e,
            source: None,
        })?;

    let time_to_complete = match item.get("time_to_complete") {
        Some(attr) => Some(
            attr.as_n()
                .ok()
                .and_then(|n| n.parse::<u32>().ok())
                .ok_or_else(|| missing_attribute("time_to_complete"))?,
        ),
        None => None,
    };

    let deadline = match item.get("deadline") {
        Some(attr) => Some(
            attr.as_s()
                .ok()
                .cloned()
                .ok_or_else(|| missing_attribute("deadline"))?,
        ),
        None => None,
    };

    let solutions = match item.get("solutions") {
        Some(attr) => {
            let list = attr
                .as_l()
                .ok()
                .ok_or_else(|| missing_attribute("solutions"))?;
            let mut entries = Vec::with_capacity(list.len());
            for element in list {
                entries.push(
                    element
                        .as_s()
                        .ok()
                        .cloned()
                        .ok_or_else(|| missing_attribute("solutions"))?,
                );
            }
            Some(entries)
        },
        None => None,
    };

    Ok(TaskRecord {
        id: get_s(item, "id")?.to_string(),
        created_at: get_s(item, "created_at")?.to_string(),
        updated_at: get_s(item, "updated_at")?.to_string(),
        task: get_s(item, "task")?.to_string(),
        status,
        time_to_complete,
        deadline,
        solutions,
    })
}

// ---------------------------------------------------------------------------
// StorageBackend implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl StorageBackend for DynamoDbBackend {
    async fn get(&self, id: &str) -> Result<TaskRecord, StorageError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, id))?;

        let item = result.item().ok_or_else(|| StorageError::NotFound {
            key: id.to_string(),
        })?;

        item_to_record(item)
    }

    async fn put(&self, record: &TaskRecord) -> Result<(), StorageError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &record.id))?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<TaskRecord, StorageError> {
        let (expression, names, values) = build_update_expression(patch)?;

        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression(expression)
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew);

        if let Some(names) = names {
            request = request.set_expression_attribute_names(Some(names));
        }

        let result = request.send().await.map_err(|e| map_sdk_error(e, id))?;

        let attributes = result.attributes().ok_or_else(|| StorageError::Backend {
            message: format!("update returned no attributes for key {id}"),
            source: None,
        })?;

        item_to_record(attributes)
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, id))?;
        Ok(())
    }

    async fn scan(
        &self,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> Result<Vec<TaskRecord>, StorageError> {
        let mut request = self
            .client
            .scan()
            .table_name(&self.table_name)
            .limit(i32::try_from(limit).unwrap_or(i32::MAX));

        if let Some(status) = status {
            request = request
                .filter_expression("#status_name = :status")
                .expression_attribute_names("#status_name", "status")
                .expression_attribute_values(":status", AttributeValue::S(status.to_string()));
        }

        let result = request
            .send()
            .await
            .map_err(|e| map_sdk_error(e, "scan"))?;

        let mut tasks = Vec::new();
        for item in result.items() {
            tasks.push(item_to_record(item)?);
        }
        Ok(tasks)
    }
}
