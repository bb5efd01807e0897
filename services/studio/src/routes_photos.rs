use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use editor_core::error::EditorError;
use editor_core::photo::CandidateFile;

use crate::routes_sessions::fetch;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct IngestFile {
    pub file_name: String,
    pub content_type: String,
    /// Base64 of the raw file bytes.
    pub data: String,
}

#[derive(Deserialize)]
pub struct IngestRequest {
    pub files: Vec<IngestFile>,
}

pub async fn ingest_photos(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let entry = fetch(&state, id).await?;

    let mut batch = Vec::with_capacity(req.files.len());
    for file in req.files {
        let bytes = BASE64.decode(file.data.as_bytes()).map_err(|e| {
            (StatusCode::BAD_REQUEST, format!("invalid base64 in {}: {e}", file.file_name))
        })?;
        batch.push(CandidateFile {
            name: file.file_name,
            media_type: file.content_type,
            bytes: Bytes::from(bytes),
        });
    }

    let mut session = entry.session.lock().await;
    match session.ingest(batch) {
        Ok(added) => Ok(Json(json!({ "added": added, "photos": session.photos() }))),
        Err(e @ EditorError::CapacityExceeded { .. }) => {
            Err((StatusCode::CONFLICT, e.to_string()))
        }
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

pub async fn remove_photo(
    State(state): State<SharedState>,
    Path((id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let entry = fetch(&state, id).await?;
    entry.session.lock().await.remove(photo_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Serves the staged bytes behind a photo's `blob:<uuid>` display URL.
/// Reads the registry handle directly, so it works while a generation
/// holds the session lock.
pub async fn blob_raw(
    State(state): State<SharedState>,
    Path((id, blob_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entry = fetch(&state, id).await?;
    let bytes = entry
        .blobs
        .resolve(&format!("blob:{blob_id}"))
        .ok_or((StatusCode::NOT_FOUND, "blob not found or revoked".to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream".to_string())],
        bytes.to_vec(),
    ))
}
