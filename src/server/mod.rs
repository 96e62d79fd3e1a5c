//! Web front end: a single upload page plus the JSON endpoint it calls.

pub mod handlers;
pub mod routes;

pub use routes::{create_router, AppState};

use crate::models::Config;
use crate::pipeline::SparkPipeline;
use crate::Result;
use tracing::info;

/// Bind `config.bind_addr` and serve until the process is stopped.
pub async fn serve(config: &Config, pipeline: SparkPipeline) -> Result<()> {
    let app = create_router(pipeline, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!("Social Spark listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
