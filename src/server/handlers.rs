use super::routes::AppState;
use crate::models::UploadedImage;
use crate::{Error, Result};
use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::Json;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub request_id: Uuid,
    pub description: String,
    pub description_model: String,
    pub content: String,
    pub content_model: String,
}

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>> {
    let request_id = Uuid::new_v4();
    analyze(state, multipart, request_id)
        .instrument(tracing::info_span!("analyze", %request_id))
        .await
}

async fn analyze(
    state: AppState,
    multipart: Multipart,
    request_id: Uuid,
) -> Result<Json<AnalyzeResponse>> {
    let upload = read_upload(multipart).await?;
    tracing::info!(
        "Received upload {:?} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let package = state.pipeline.run(upload).await.map_err(|e| {
        tracing::warn!("Analysis failed ({:?}): {}", e.kind(), e);
        e
    })?;

    Ok(Json(AnalyzeResponse {
        request_id,
        description: package.description.text,
        description_model: package.description.model,
        content: package.content.text,
        content_model: package.content.model,
    }))
}

/// Pull the `image` field out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidUpload(e.body_text()))?;

        return UploadedImage::new(file_name, bytes.to_vec());
    }

    Err(Error::InvalidUpload(format!(
        "missing multipart field '{}'",
        IMAGE_FIELD
    )))
}
