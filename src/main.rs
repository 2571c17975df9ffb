//! Server binary: wires a storage backend to the task tools and serves
//! them over stdio.
//!
//! Backend selection is a compile-time choice: builds with the `dynamodb`
//! feature talk to the table named by `TASK_TABLE_NAME` (default
//! `TaskTable`); default builds use the in-memory backend, which is handy
//! for local experimentation but forgets everything on exit.

use std::sync::Arc;

use task_tracker_mcp::tools::build_server;
use task_tracker_mcp::TaskModel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    #[cfg(feature = "dynamodb")]
    {
        use task_tracker_mcp::store::dynamodb::DynamoDbBackend;
        use task_tracker_mcp::TrackerConfig;

        let config = TrackerConfig::from_env();
        tracing::info!(table = %config.table_name, "starting with DynamoDB backend");

        let backend = DynamoDbBackend::from_env_with_table(&config.table_name).await;
        let model = Arc::new(TaskModel::new(backend));
        let server = build_server(model)?;
        server.run_stdio().await?;
    }

    #[cfg(not(feature = "dynamodb"))]
    {
        use task_tracker_mcp::store::memory::InMemoryBackend;

        tracing::info!("starting with in-memory backend");

        let model = Arc::new(TaskModel::new(InMemoryBackend::new()));
        let server = build_server(model)?;
        server.run_stdio().await?;
    }

    Ok(())
}
