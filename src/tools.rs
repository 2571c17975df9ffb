//! Tool layer: the five callable operations exposed over MCP.
//!
//! Each tool declares its input contract as a JSON Schema via
//! [`ToolInfo`] and enforces it handler-side before anything reaches the
//! record layer: argument parsing, per-field constraint checks, and the
//! future-deadline business rule (which cannot be a static schema
//! constraint because "future" is evaluated against the current instant).
//!
//! Every handler returns a uniform envelope as its JSON payload -- a
//! `success` flag plus the operation result on success, or the verbatim
//! error message, request context, and a timestamp on failure. No error is
//! ever allowed to escape as a protocol fault: validation failures,
//! missing tasks, and store failures all surface as failure envelopes,
//! distinguishable by their message text.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pmcp::types::capabilities::{ServerCapabilities, ToolCapabilities};
use pmcp::types::ToolInfo;
use pmcp::{RequestHandlerExtra, Server, ToolHandler};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::TrackerError;
use crate::model::{NewTask, TaskModel, TaskUpdate};
use crate::store::backend::StorageBackend;
use crate::types::{now_rfc3339, TaskStatus};

/// Maximum characters in a task description.
const MAX_DESCRIPTION_CHARS: usize = 500;
/// Maximum estimate in minutes (one week).
const MAX_TIME_TO_COMPLETE: u32 = 10_080;
/// Maximum number of solution entries.
const MAX_SOLUTIONS: usize = 10;
/// Maximum page size for listing.
const MAX_LIMIT: u32 = 100;
/// Page size applied when the caller omits `limit`.
const DEFAULT_LIMIT: u32 = 50;

// ---------------------------------------------------------------------------
// Tool inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreateTaskInput {
    task: String,
    #[serde(default)]
    time_to_complete: Option<u32>,
    #[serde(default)]
    deadline: Option<String>,
    #[serde(default)]
    solutions: Option<Vec<String>>,
    #[serde(default)]
    status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
struct GetTaskInput {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateTaskInput {
    task_id: String,
    #[serde(default)]
    task: Option<String>,
    #[serde(default)]
    time_to_complete: Option<u32>,
    #[serde(default)]
    deadline: Option<String>,
    #[serde(default)]
    solutions: Option<Vec<String>>,
    #[serde(default)]
    status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
struct DeleteTaskInput {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct ListTasksInput {
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    limit: Option<u32>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, TrackerError> {
    serde_json::from_value(args)
        .map_err(|e| TrackerError::validation(format!("Invalid arguments: {e}")))
}

/// Trims the description and enforces the 1-500 character bound.
fn validate_description(raw: &str) -> Result<String, TrackerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::validation("Task description cannot be empty"));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(TrackerError::validation("Task description too long"));
    }
    Ok(trimmed.to_string())
}

fn validate_time_to_complete(minutes: u32) -> Result<(), TrackerError> {
    if minutes == 0 {
        return Err(TrackerError::validation("Time to complete must be positive"));
    }
    if minutes > MAX_TIME_TO_COMPLETE {
        return Err(TrackerError::validation(
            "Time cannot exceed a week in minutes",
        ));
    }
    Ok(())
}

fn validate_solutions(solutions: &[String]) -> Result<(), TrackerError> {
    if solutions.len() > MAX_SOLUTIONS {
        return Err(TrackerError::validation(
            "Too many solutions - maximum 10 allowed",
        ));
    }
    if solutions.iter().any(|s| s.trim().is_empty()) {
        return Err(TrackerError::validation("Solution cannot be empty"));
    }
    Ok(())
}

/// Checks the RFC 3339 shape of a deadline and the future-deadline
/// business rule.
///
/// The format check is a schema concern; the strictly-in-the-future check
/// compares against the clock at validation time, so it lives here as an
/// explicit comparison.
fn validate_deadline(deadline: &str) -> Result<(), TrackerError> {
    let parsed = DateTime::parse_from_rfc3339(deadline).map_err(|_| {
        TrackerError::validation("Invalid deadline format - use ISO 8601 format")
    })?;
    if parsed.with_timezone(&Utc) <= Utc::now() {
        return Err(TrackerError::validation("Deadline must be in the future"));
    }
    Ok(())
}

fn validate_task_id(task_id: &str) -> Result<(), TrackerError> {
    Uuid::parse_str(task_id)
        .map(|_| ())
        .map_err(|_| TrackerError::validation("Invalid task ID format"))
}

fn validate_limit(limit: u32) -> Result<(), TrackerError> {
    if limit == 0 {
        return Err(TrackerError::validation("Limit must be positive"));
    }
    if limit > MAX_LIMIT {
        return Err(TrackerError::validation("Limit cannot exceed 100"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Builds the uniform failure envelope: `success: false`, the verbatim
/// error message, caller-supplied request context, and a timestamp.
fn failure_envelope(err: &TrackerError, context: &[(&str, Value)]) -> Value {
    let mut envelope = Map::new();
    envelope.insert("success".to_string(), Value::Bool(false));
    envelope.insert("error".to_string(), Value::String(err.to_string()));
    for (key, value) in context {
        envelope.insert((*key).to_string(), value.clone());
    }
    envelope.insert("timestamp".to_string(), Value::String(now_rfc3339()));
    Value::Object(envelope)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn run_create<B: StorageBackend>(model: &TaskModel<B>, args: Value) -> Value {
    let input: CreateTaskInput = match parse_args(args) {
        Ok(input) => input,
        Err(err) => return failure_envelope(&err, &[]),
    };

    let task = match validate_description(&input.task) {
        Ok(task) => task,
        Err(err) => return failure_envelope(&err, &[]),
    };
    if let Some(minutes) = input.time_to_complete {
        if let Err(err) = validate_time_to_complete(minutes) {
            return failure_envelope(&err, &[]);
        }
    }
    if let Some(solutions) = &input.solutions {
        if let Err(err) = validate_solutions(solutions) {
            return failure_envelope(&err, &[]);
        }
    }
    if let Some(deadline) = &input.deadline {
        if let Err(err) = validate_deadline(deadline) {
            return failure_envelope(&err, &[("provided_deadline", json!(deadline))]);
        }
    }

    let new = NewTask {
        task,
        status: input.status.unwrap_or_default(),
        time_to_complete: input.time_to_complete,
        deadline: input.deadline,
        solutions: input.solutions,
    };

    match model.create(new).await {
        Ok(created) => json!({
            "success": true,
            "task_id": created.task_id,
            "message": created.message,
            "task": created.task,
        }),
        Err(err) => failure_envelope(&err, &[]),
    }
}

async fn run_get<B: StorageBackend>(model: &TaskModel<B>, args: Value) -> Value {
    let input: GetTaskInput = match parse_args(args) {
        Ok(input) => input,
        Err(err) => return failure_envelope(&err, &[]),
    };

    if let Err(err) = validate_task_id(&input.task_id) {
        return failure_envelope(&err, &[("task_id", json!(input.task_id))]);
    }

    match model.get(&input.task_id).await {
        Ok(task) => json!({
            "success": true,
            "task": task,
        }),
        Err(err) => failure_envelope(&err, &[("task_id", json!(input.task_id))]),
    }
}

async fn run_update<B: StorageBackend>(model: &TaskModel<B>, args: Value) -> Value {
    let input: UpdateTaskInput = match parse_args(args) {
        Ok(input) => input,
        Err(err) => return failure_envelope(&err, &[]),
    };

    let id_context = [("task_id", json!(input.task_id))];

    if let Err(err) = validate_task_id(&input.task_id) {
        return failure_envelope(&err, &id_context);
    }

    if input.task.is_none()
        && input.time_to_complete.is_none()
        && input.deadline.is_none()
        && input.solutions.is_none()
        && input.status.is_none()
    {
        let err = TrackerError::validation("At least one field must be provided for update");
        return failure_envelope(&err, &id_context);
    }

    let task = match &input.task {
        Some(raw) => match validate_description(raw) {
            Ok(task) => Some(task),
            Err(err) => return failure_envelope(&err, &id_context),
        },
        None => None,
    };
    if let Some(minutes) = input.time_to_complete {
        if let Err(err) = validate_time_to_complete(minutes) {
            return failure_envelope(&err, &id_context);
        }
    }
    if let Some(solutions) = &input.solutions {
        if let Err(err) = validate_solutions(solutions) {
            return failure_envelope(&err, &id_context);
        }
    }
    if let Some(deadline) = &input.deadline {
        if let Err(err) = validate_deadline(deadline) {
            return failure_envelope(
                &err,
                &[
                    ("provided_deadline", json!(deadline)),
                    ("task_id", json!(input.task_id)),
                ],
            );
        }
    }

    let update = TaskUpdate {
        task,
        time_to_complete: input.time_to_complete,
        deadline: input.deadline.clone(),
        solutions: input.solutions.clone(),
        status: input.status,
    };

    match model.update(&input.task_id, update).await {
        Ok(updated) => json!({
            "success": true,
            "task_id": input.task_id,
            "message": updated.message,
            "task": updated.task,
        }),
        Err(err) => failure_envelope(&err, &id_context),
    }
}

async fn run_delete<B: StorageBackend>(model: &TaskModel<B>, args: Value) -> Value {
    let input: DeleteTaskInput = match parse_args(args) {
        Ok(input) => input,
        Err(err) => return failure_envelope(&err, &[]),
    };

    if let Err(err) = validate_task_id(&input.task_id) {
        return failure_envelope(&err, &[("task_id", json!(input.task_id))]);
    }

    match model.delete(&input.task_id).await {
        Ok(message) => json!({
            "success": true,
            "message": message,
            "task_id": input.task_id,
            "timestamp": now_rfc3339(),
        }),
        Err(err) => failure_envelope(&err, &[("task_id", json!(input.task_id))]),
    }
}

async fn run_list<B: StorageBackend>(model: &TaskModel<B>, args: Value) -> Value {
    let input: ListTasksInput = match parse_args(args) {
        Ok(input) => input,
        Err(err) => return failure_envelope(&err, &[]),
    };

    let limit = input.limit.unwrap_or(DEFAULT_LIMIT);
    let filter = input
        .status
        .map_or_else(|| json!("none"), |status| json!({ "status": status }));

    if let Err(err) = validate_limit(limit) {
        return failure_envelope(
            &err,
            &[("filter", filter.clone()), ("limit", json!(limit))],
        );
    }

    match model.list(input.status, limit as usize).await {
        Ok(listing) => json!({
            "success": true,
            "filter": filter,
            "limit": limit,
            "tasks": listing.tasks,
            "count": listing.count,
            "timestamp": now_rfc3339(),
        }),
        Err(err) => failure_envelope(
            &err,
            &[("filter", filter.clone()), ("limit", json!(limit))],
        ),
    }
}

// ---------------------------------------------------------------------------
// Input schemas
// ---------------------------------------------------------------------------

fn task_id_property() -> Value {
    json!({
        "type": "string",
        "format": "uuid",
        "description": "Unique task identifier"
    })
}

fn mutable_field_properties() -> Value {
    json!({
        "task": {
            "type": "string",
            "minLength": 1,
            "maxLength": MAX_DESCRIPTION_CHARS,
            "description": "Task description"
        },
        "time_to_complete": {
            "type": "integer",
            "exclusiveMinimum": 0,
            "maximum": MAX_TIME_TO_COMPLETE,
            "description": "Estimated minutes to complete (at most one week)"
        },
        "deadline": {
            "type": "string",
            "format": "date-time",
            "description": "Completion deadline (ISO 8601, must be in the future)"
        },
        "solutions": {
            "type": "array",
            "items": { "type": "string", "minLength": 1 },
            "maxItems": MAX_SOLUTIONS,
            "description": "Candidate solutions"
        },
        "status": {
            "type": "string",
            "enum": ["not_started", "in_progress", "done", "archived"],
            "description": "Task status"
        }
    })
}

fn create_task_schema() -> Value {
    let mut properties = mutable_field_properties();
    properties["status"]["default"] = json!("not_started");
    json!({
        "type": "object",
        "properties": properties,
        "required": ["task"]
    })
}

fn get_task_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "task_id": task_id_property() },
        "required": ["task_id"]
    })
}

fn update_task_schema() -> Value {
    let mut properties = mutable_field_properties();
    properties["task_id"] = task_id_property();
    json!({
        "type": "object",
        "properties": properties,
        "required": ["task_id"],
        "description": "At least one field besides task_id must be provided"
    })
}

fn delete_task_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "task_id": task_id_property() },
        "required": ["task_id"]
    })
}

fn list_tasks_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "status": {
                "type": "string",
                "enum": ["not_started", "in_progress", "done", "archived"],
                "description": "Filter tasks by status"
            },
            "limit": {
                "type": "integer",
                "minimum": 1,
                "maximum": MAX_LIMIT,
                "default": DEFAULT_LIMIT,
                "description": "Maximum number of tasks to return"
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Tool handlers
// ---------------------------------------------------------------------------

/// `create_task` -- creates a new task record.
pub struct CreateTaskTool<B> {
    model: Arc<TaskModel<B>>,
}

impl<B> CreateTaskTool<B> {
    /// Creates the tool over a shared model.
    pub fn new(model: Arc<TaskModel<B>>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<B: StorageBackend + 'static> ToolHandler for CreateTaskTool<B> {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        Ok(run_create(&self.model, args).await)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            "create_task",
            Some("Create a new task with optional time estimate, deadline, and solutions".to_string()),
            create_task_schema(),
        ))
    }
}

/// `get_task` -- retrieves a task by id.
pub struct GetTaskTool<B> {
    model: Arc<TaskModel<B>>,
}

impl<B> GetTaskTool<B> {
    /// Creates the tool over a shared model.
    pub fn new(model: Arc<TaskModel<B>>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<B: StorageBackend + 'static> ToolHandler for GetTaskTool<B> {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        Ok(run_get(&self.model, args).await)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            "get_task",
            Some("Retrieve a specific task by its unique identifier".to_string()),
            get_task_schema(),
        ))
    }
}

/// `update_task` -- applies a partial update to an existing task.
pub struct UpdateTaskTool<B> {
    model: Arc<TaskModel<B>>,
}

impl<B> UpdateTaskTool<B> {
    /// Creates the tool over a shared model.
    pub fn new(model: Arc<TaskModel<B>>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<B: StorageBackend + 'static> ToolHandler for UpdateTaskTool<B> {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        Ok(run_update(&self.model, args).await)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            "update_task",
            Some("Update an existing task with new information".to_string()),
            update_task_schema(),
        ))
    }
}

/// `delete_task` -- permanently removes a task.
pub struct DeleteTaskTool<B> {
    model: Arc<TaskModel<B>>,
}

impl<B> DeleteTaskTool<B> {
    /// Creates the tool over a shared model.
    pub fn new(model: Arc<TaskModel<B>>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<B: StorageBackend + 'static> ToolHandler for DeleteTaskTool<B> {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        Ok(run_delete(&self.model, args).await)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            "delete_task",
            Some("Permanently delete a task from the system".to_string()),
            delete_task_schema(),
        ))
    }
}

/// `list_tasks` -- enumerates tasks with optional status filtering.
pub struct ListTasksTool<B> {
    model: Arc<TaskModel<B>>,
}

impl<B> ListTasksTool<B> {
    /// Creates the tool over a shared model.
    pub fn new(model: Arc<TaskModel<B>>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<B: StorageBackend + 'static> ToolHandler for ListTasksTool<B> {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        Ok(run_list(&self.model, args).await)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            "list_tasks",
            Some("Retrieve a list of tasks, optionally filtered by status".to_string()),
            list_tasks_schema(),
        ))
    }
}

/// Builds the MCP server with all five task tools registered.
///
/// The model is shared across handlers; each call is an independent,
/// stateless unit of work.
pub fn build_server<B: StorageBackend + 'static>(
    model: Arc<TaskModel<B>>,
) -> pmcp::Result<Server> {
    let mut capabilities = ServerCapabilities::default();
    capabilities.tools = Some(ToolCapabilities::default());
    Server::builder()
        .name("task-tracker-mcp")
        .version(env!("CARGO_PKG_VERSION"))
        .capabilities(capabilities)
        .tool("create_task", CreateTaskTool::new(model.clone()))
        .tool("get_task", GetTaskTool::new(model.clone()))
        .tool("update_task", UpdateTaskTool::new(model.clone()))
        .tool("delete_task", DeleteTaskTool::new(model.clone()))
        .tool("list_tasks", ListTasksTool::new(model))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryBackend;
    use pretty_assertions::assert_eq;

    fn test_model() -> TaskModel<InMemoryBackend> {
        TaskModel::new(InMemoryBackend::new())
    }

    // ---- Validation helpers ----

    #[test]
    fn description_is_trimmed() {
        assert_eq!(validate_description("  Write docs  ").unwrap(), "Write docs");
    }

    #[test]
    fn description_rejects_empty_and_whitespace() {
        let err = validate_description("").unwrap_err();
        assert_eq!(err.to_string(), "Task description cannot be empty");
        let err = validate_description("   ").unwrap_err();
        assert_eq!(err.to_string(), "Task description cannot be empty");
    }

    #[test]
    fn description_rejects_over_500_chars() {
        let long = "x".repeat(501);
        let err = validate_description(&long).unwrap_err();
        assert_eq!(err.to_string(), "Task description too long");
        // Exactly 500 is allowed.
        assert!(validate_description(&"x".repeat(500)).is_ok());
    }

    #[test]
    fn time_to_complete_bounds() {
        assert_eq!(
            validate_time_to_complete(0).unwrap_err().to_string(),
            "Time to complete must be positive"
        );
        assert_eq!(
            validate_time_to_complete(10_081).unwrap_err().to_string(),
            "Time cannot exceed a week in minutes"
        );
        assert!(validate_time_to_complete(10_080).is_ok());
        assert!(validate_time_to_complete(1).is_ok());
    }

    #[test]
    fn solutions_bounds() {
        let eleven: Vec<String> = (0..11).map(|i| format!("s{i}")).collect();
        assert_eq!(
            validate_solutions(&eleven).unwrap_err().to_string(),
            "Too many solutions - maximum 10 allowed"
        );
        let with_blank = vec!["fine".to_string(), " ".to_string()];
        assert_eq!(
            validate_solutions(&with_blank).unwrap_err().to_string(),
            "Solution cannot be empty"
        );
        let ten: Vec<String> = (0..10).map(|i| format!("s{i}")).collect();
        assert!(validate_solutions(&ten).is_ok());
    }

    #[test]
    fn deadline_format_and_future_rule() {
        assert_eq!(
            validate_deadline("tomorrow").unwrap_err().to_string(),
            "Invalid deadline format - use ISO 8601 format"
        );
        assert_eq!(
            validate_deadline("2000-01-01T00:00:00Z").unwrap_err().to_string(),
            "Deadline must be in the future"
        );
        assert!(validate_deadline("2099-01-01T00:00:00Z").is_ok());
    }

    #[test]
    fn task_id_must_be_uuid() {
        assert_eq!(
            validate_task_id("not-a-uuid").unwrap_err().to_string(),
            "Invalid task ID format"
        );
        assert!(validate_task_id("7c9e6679-7425-40de-944b-e07fc1f90ae7").is_ok());
    }

    #[test]
    fn limit_bounds() {
        assert_eq!(
            validate_limit(0).unwrap_err().to_string(),
            "Limit must be positive"
        );
        assert_eq!(
            validate_limit(101).unwrap_err().to_string(),
            "Limit cannot exceed 100"
        );
        assert!(validate_limit(100).is_ok());
    }

    // ---- Envelope shape ----

    #[test]
    fn failure_envelope_carries_context_and_timestamp() {
        let err = TrackerError::validation("Invalid task ID format");
        let envelope = failure_envelope(&err, &[("task_id", json!("abc"))]);
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "Invalid task ID format");
        assert_eq!(envelope["task_id"], "abc");
        assert!(envelope["timestamp"].as_str().is_some());
    }

    // ---- create_task ----

    #[tokio::test]
    async fn create_returns_success_envelope() {
        let model = test_model();
        let envelope = run_create(&model, json!({ "task": "Write docs" })).await;
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["task"]["status"], "not_started");
        assert_eq!(envelope["task"]["task"], "Write docs");
        assert_eq!(
            envelope["task"]["created_at"],
            envelope["task"]["updated_at"]
        );
        let id = envelope["task_id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert!(envelope["message"].as_str().unwrap().contains(id));
    }

    #[tokio::test]
    async fn create_trims_description_before_storage() {
        let model = test_model();
        let envelope = run_create(&model, json!({ "task": "  padded  " })).await;
        assert_eq!(envelope["task"]["task"], "padded");
    }

    #[tokio::test]
    async fn create_with_past_deadline_writes_nothing() {
        let model = test_model();
        let envelope = run_create(
            &model,
            json!({ "task": "x", "deadline": "2000-01-01T00:00:00Z" }),
        )
        .await;
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "Deadline must be in the future");
        assert_eq!(envelope["provided_deadline"], "2000-01-01T00:00:00Z");
        // Record never written.
        assert!(model.backend().is_empty());
    }

    #[tokio::test]
    async fn create_with_malformed_args_is_validation_failure() {
        let model = test_model();
        let envelope = run_create(&model, json!({})).await;
        assert_eq!(envelope["success"], false);
        assert!(envelope["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid arguments:"));
        assert!(model.backend().is_empty());
    }

    #[tokio::test]
    async fn create_with_unknown_status_is_rejected_before_store() {
        let model = test_model();
        let envelope = run_create(&model, json!({ "task": "x", "status": "paused" })).await;
        assert_eq!(envelope["success"], false);
        assert!(model.backend().is_empty());
    }

    #[tokio::test]
    async fn create_respects_explicit_status() {
        let model = test_model();
        let envelope =
            run_create(&model, json!({ "task": "x", "status": "in_progress" })).await;
        assert_eq!(envelope["task"]["status"], "in_progress");
    }

    // ---- get_task ----

    #[tokio::test]
    async fn get_returns_stored_record() {
        let model = test_model();
        let created = run_create(&model, json!({ "task": "fetch me" })).await;
        let id = created["task_id"].as_str().unwrap();
        let envelope = run_get(&model, json!({ "task_id": id })).await;
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["task"], created["task"]);
    }

    #[tokio::test]
    async fn get_missing_returns_not_found_envelope() {
        let model = test_model();
        let id = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
        let envelope = run_get(&model, json!({ "task_id": id })).await;
        assert_eq!(envelope["success"], false);
        assert_eq!(
            envelope["error"],
            format!("Task not found with ID: {id}")
        );
        assert_eq!(envelope["task_id"], id);
        assert!(envelope["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn get_rejects_malformed_id() {
        let model = test_model();
        let envelope = run_get(&model, json!({ "task_id": "nope" })).await;
        assert_eq!(envelope["error"], "Invalid task ID format");
    }

    // ---- update_task ----

    #[tokio::test]
    async fn update_with_only_id_is_rejected_before_store() {
        let model = test_model();
        let created = run_create(&model, json!({ "task": "unchanged" })).await;
        let id = created["task_id"].as_str().unwrap();

        let envelope = run_update(&model, json!({ "task_id": id })).await;
        assert_eq!(envelope["success"], false);
        assert_eq!(
            envelope["error"],
            "At least one field must be provided for update"
        );

        // The record is untouched, updated_at included.
        let fetched = run_get(&model, json!({ "task_id": id })).await;
        assert_eq!(fetched["task"]["updated_at"], created["task"]["updated_at"]);
    }

    #[tokio::test]
    async fn update_changes_status_and_echoes_id() {
        let model = test_model();
        let created = run_create(&model, json!({ "task": "progress me" })).await;
        let id = created["task_id"].as_str().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        let envelope = run_update(&model, json!({ "task_id": id, "status": "done" })).await;
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["task_id"], id);
        assert_eq!(envelope["message"], "Task updated successfully");
        assert_eq!(envelope["task"]["status"], "done");
        assert_eq!(envelope["task"]["task"], "progress me");
        assert!(
            envelope["task"]["updated_at"].as_str().unwrap()
                > created["task"]["updated_at"].as_str().unwrap()
        );
    }

    #[tokio::test]
    async fn update_trims_replacement_description() {
        let model = test_model();
        let created = run_create(&model, json!({ "task": "before" })).await;
        let id = created["task_id"].as_str().unwrap();
        let envelope = run_update(&model, json!({ "task_id": id, "task": "  after  " })).await;
        assert_eq!(envelope["task"]["task"], "after");
    }

    #[tokio::test]
    async fn update_missing_task_returns_not_found() {
        let model = test_model();
        let id = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
        let envelope = run_update(&model, json!({ "task_id": id, "status": "done" })).await;
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], format!("Task not found with ID: {id}"));
    }

    #[tokio::test]
    async fn update_past_deadline_carries_context() {
        let model = test_model();
        let created = run_create(&model, json!({ "task": "deadline me" })).await;
        let id = created["task_id"].as_str().unwrap();
        let envelope = run_update(
            &model,
            json!({ "task_id": id, "deadline": "2000-01-01T00:00:00Z" }),
        )
        .await;
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "Deadline must be in the future");
        assert_eq!(envelope["provided_deadline"], "2000-01-01T00:00:00Z");
        assert_eq!(envelope["task_id"], id);
    }

    // ---- delete_task ----

    #[tokio::test]
    async fn delete_confirms_with_id_and_timestamp() {
        let model = test_model();
        let created = run_create(&model, json!({ "task": "remove me" })).await;
        let id = created["task_id"].as_str().unwrap();

        let envelope = run_delete(&model, json!({ "task_id": id })).await;
        assert_eq!(envelope["success"], true);
        assert_eq!(
            envelope["message"],
            format!("Task deleted successfully: {id}")
        );
        assert_eq!(envelope["task_id"], id);
        assert!(envelope["timestamp"].as_str().is_some());

        let after = run_get(&model, json!({ "task_id": id })).await;
        assert_eq!(after["success"], false);
    }

    #[tokio::test]
    async fn delete_missing_returns_not_found_envelope() {
        let model = test_model();
        let id = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
        let envelope = run_delete(&model, json!({ "task_id": id })).await;
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], format!("Task not found with ID: {id}"));
    }

    // ---- list_tasks ----

    #[tokio::test]
    async fn list_defaults_limit_and_echoes_filter_none() {
        let model = test_model();
        run_create(&model, json!({ "task": "a" })).await;
        let envelope = run_list(&model, json!({})).await;
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["limit"], 50);
        assert_eq!(envelope["filter"], "none");
        assert_eq!(envelope["count"], 1);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_echoes_filter() {
        let model = test_model();
        for _ in 0..3 {
            run_create(&model, json!({ "task": "active", "status": "in_progress" })).await;
        }
        for _ in 0..5 {
            run_create(&model, json!({ "task": "finished", "status": "done" })).await;
        }

        let envelope =
            run_list(&model, json!({ "status": "in_progress", "limit": 10 })).await;
        assert_eq!(envelope["count"], 3);
        assert_eq!(envelope["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(envelope["filter"], json!({ "status": "in_progress" }));
        assert_eq!(envelope["limit"], 10);
    }

    #[tokio::test]
    async fn list_rejects_out_of_range_limit() {
        let model = test_model();
        let envelope = run_list(&model, json!({ "limit": 101 })).await;
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "Limit cannot exceed 100");
        assert_eq!(envelope["limit"], 101);

        let envelope = run_list(&model, json!({ "limit": 0 })).await;
        assert_eq!(envelope["error"], "Limit must be positive");
    }

    // ---- Schemas ----

    #[test]
    fn create_schema_requires_task_and_defaults_status() {
        let schema = create_task_schema();
        assert_eq!(schema["required"], json!(["task"]));
        assert_eq!(schema["properties"]["status"]["default"], "not_started");
        assert_eq!(schema["properties"]["task"]["maxLength"], 500);
    }

    #[test]
    fn update_schema_requires_only_task_id() {
        let schema = update_task_schema();
        assert_eq!(schema["required"], json!(["task_id"]));
        assert!(schema["properties"]["status"].is_object());
    }

    #[test]
    fn list_schema_bounds_limit() {
        let schema = list_tasks_schema();
        assert_eq!(schema["properties"]["limit"]["maximum"], 100);
        assert_eq!(schema["properties"]["limit"]["default"], 50);
    }

    #[test]
    fn status_enum_covers_all_values() {
        let schema = create_task_schema();
        assert_eq!(
            schema["properties"]["status"]["enum"],
            json!(["not_started", "in_progress", "done", "archived"])
        );
    }
}
