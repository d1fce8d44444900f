use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    models::{GenerateVideoRequest, GenerateVideoResponse, MediaStore, UploadResponse},
    upload::{self, UploadError},
    veo::{VeoClient, VeoError},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MediaStore>,
    pub veo: Arc<VeoClient>,
}

/// Failure surfaced to the front end: a status code plus the upstream
/// message, so the UI can show it and offer a retry from scratch.
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError(StatusCode::UNSUPPORTED_MEDIA_TYPE, err.to_string())
    }
}

impl From<VeoError> for ApiError {
    fn from(err: VeoError) -> Self {
        let status = match err {
            VeoError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        };
        ApiError(status, err.to_string())
    }
}

fn media_url(id: &Uuid) -> String {
    format!("/api/media/{}", id)
}

pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.to_string()))?;

        let encoded = upload::capture(&data, &media_type)?;
        let preview_id = state.store.insert(data, &media_type);
        tracing::info!("🖼️ Captured {} upload, preview handle {}", media_type, preview_id);

        return Ok(Json(UploadResponse {
            image_base64: encoded.data,
            mime_type: encoded.media_type,
            preview_id,
            preview_url: media_url(&preview_id),
        }));
    }
    Err(ApiError(StatusCode::BAD_REQUEST, "missing 'image' field".into()))
}

pub async fn generate_video(
    State(state): State<AppState>,
    Json(body): Json<GenerateVideoRequest>,
) -> Result<Json<GenerateVideoResponse>, ApiError> {
    if body.prompt.trim().is_empty() {
        return Err(ApiError(StatusCode::BAD_REQUEST, "prompt must not be empty".into()));
    }

    tracing::info!("🚀 Generating video for prompt: {}", body.prompt);
    let bytes = state
        .veo
        .generate_video(&body.image_base64, &body.mime_type, &body.prompt)
        .await?;

    let video_id = state.store.insert(bytes, "video/mp4");
    tracing::info!("✅ Video ready under handle {}", video_id);

    Ok(Json(GenerateVideoResponse {
        video_url: media_url(&video_id),
        video_id,
    }))
}

pub async fn get_media(Path(id): Path<Uuid>, State(state): State<AppState>) -> Response {
    if let Some(media) = state.store.get(&id) {
        tracing::info!(
            "📺 Serving {} ({} bytes, stored {})",
            id,
            media.bytes.len(),
            media.created_at
        );
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::CONTENT_TYPE,
            media
                .content_type
                .parse()
                .unwrap_or(HeaderValue::from_static("application/octet-stream")),
        );
        return (StatusCode::OK, headers, media.bytes).into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}

pub async fn revoke_media(Path(id): Path<Uuid>, State(state): State<AppState>) -> StatusCode {
    if state.store.remove(&id) {
        tracing::info!("🗑️ Revoked media handle {}", id);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
