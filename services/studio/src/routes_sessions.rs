use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::state::{SessionEntry, SharedState};

pub(crate) async fn fetch(
    state: &SharedState,
    id: Uuid,
) -> Result<SessionEntry, (StatusCode, String)> {
    state
        .session(id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "session not found".to_string()))
}

pub async fn healthz(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "backend": state.backend.info() }))
}

pub async fn create_session(
    State(state): State<SharedState>,
) -> (StatusCode, Json<serde_json::Value>) {
    let id = state.create_session().await;
    tracing::info!(session_id = %id, "session created");
    (StatusCode::CREATED, Json(json!({ "session_id": id })))
}

pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let entry = fetch(&state, id).await?;
    let session = entry.session.lock().await;
    Ok(Json(json!({
        "session_id": id,
        "photos": session.photos(),
        "config": session.config(),
        "job": session.job(),
    })))
}

pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.drop_session(id).await {
        tracing::info!(session_id = %id, "session discarded");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "session not found".to_string()))
    }
}
