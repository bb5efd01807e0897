use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use editor_core::config::ConfigPatch;
use editor_core::error::EditorError;
use editor_core::job::GenerationJob;
use editor_core::notice::Notice;

use crate::routes_sessions::fetch;
use crate::state::SharedState;

pub async fn update_config(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ConfigPatch>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let entry = fetch(&state, id).await?;
    let mut session = entry.session.lock().await;
    session.update_config(patch);
    Ok(Json(json!({ "config": session.config() })))
}

/// Kicks off a generation job. The job runs in a spawned task that
/// holds the session lock until a terminal state; status is polled via
/// the job watch, not this call.
pub async fn start_generation(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, String)> {
    let entry = fetch(&state, id).await?;

    // A running generation holds the session lock end to end, so a
    // held lock IS the active job; waiting on it would park this
    // request until the job finishes and then start a duplicate run.
    let mut session = match entry.session.clone().try_lock_owned() {
        Ok(guard) => guard,
        Err(_) => {
            return Err((StatusCode::CONFLICT, EditorError::JobActive.to_string()));
        }
    };
    if session.job().is_active() {
        return Err((StatusCode::CONFLICT, EditorError::JobActive.to_string()));
    }
    if session.photos().is_empty() {
        return Err((StatusCode::BAD_REQUEST, EditorError::EmptySubmission.to_string()));
    }

    // The guard moves into the task, so no competing request can slip
    // in between the checks above and the job taking the lock.
    tokio::spawn(async move {
        if let Err(e) = session.start_generation().await {
            warn!(session_id = %id, error = %e, "generation did not complete");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "started" }))))
}

pub async fn job_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GenerationJob>, (StatusCode, String)> {
    let entry = fetch(&state, id).await?;
    let job = entry.job.borrow().clone();
    Ok(Json(job))
}

/// Drains pending toasts; each is delivered once.
pub async fn drain_notices(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Notice>>, (StatusCode, String)> {
    let entry = fetch(&state, id).await?;
    let mut buffer = entry.notices.lock().expect("notice buffer lock");
    Ok(Json(std::mem::take(&mut *buffer)))
}

pub async fn play_preview(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let entry = fetch(&state, id).await?;
    let session = entry.session.lock().await;
    let playback = session
        .play_preview()
        .ok_or((StatusCode::NOT_FOUND, "no preview available".to_string()))?;
    Ok(Json(json!({ "playback": playback })))
}

pub async fn download_preview(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entry = fetch(&state, id).await?;
    let session = entry.session.lock().await;
    let download = session
        .download_preview()
        .await
        .ok_or((StatusCode::NOT_FOUND, "no preview available".to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.file_name),
            ),
        ],
        download.bytes.to_vec(),
    ))
}
