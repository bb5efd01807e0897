mod backend_http;
mod config;
mod routes_generate;
mod routes_photos;
mod routes_sessions;
mod state;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use editor_core::backend::GenerationBackend;
use editor_core::session::SessionOptions;
use editor_core::synthetic::SyntheticBackend;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env()?;
    let backend = select_backend(&cfg).await;
    info!(backend = %backend.info().name, "studio starting");

    let mut session_options = SessionOptions::default();
    if let Some(tick) = cfg.sim_tick {
        session_options.simulated_tick = tick;
    }

    let state = Arc::new(AppState::new(backend, session_options));

    let app = Router::new()
        .route("/healthz", get(routes_sessions::healthz))
        .route("/sessions", post(routes_sessions::create_session))
        .route(
            "/sessions/:id",
            get(routes_sessions::get_session).delete(routes_sessions::delete_session),
        )
        .route("/sessions/:id/photos", post(routes_photos::ingest_photos))
        .route("/sessions/:id/photos/:photo_id", axum::routing::delete(routes_photos::remove_photo))
        .route("/sessions/:id/blobs/:blob_id", get(routes_photos::blob_raw))
        .route("/sessions/:id/config", patch(routes_generate::update_config))
        .route("/sessions/:id/generate", post(routes_generate::start_generation))
        .route("/sessions/:id/job", get(routes_generate::job_status))
        .route("/sessions/:id/notices", get(routes_generate::drain_notices))
        .route("/sessions/:id/preview", get(routes_generate::play_preview))
        .route("/sessions/:id/preview/download", get(routes_generate::download_preview))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = &cfg.bind_addr;
    info!("studio listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Remote backend when both endpoints are configured and reachable,
/// otherwise the local synthetic fallback (degraded/offline mode:
/// same state machine, placeholder artifacts).
async fn select_backend(cfg: &AppConfig) -> Arc<dyn GenerationBackend> {
    match cfg.remote() {
        Some((upload_url, compose_url)) => {
            let backend = backend_http::HttpBackend::new(upload_url, compose_url);
            match backend.ping().await {
                Ok(()) => {
                    info!(base_url = ?backend.info().base_url, "generation backend: ok");
                    Arc::new(backend)
                }
                Err(e) => {
                    warn!(error = %e, "generation backend unreachable, falling back to synthetic");
                    Arc::new(SyntheticBackend::new())
                }
            }
        }
        None => Arc::new(SyntheticBackend::new()),
    }
}
