// src/calendar/server.rs

//! Minimal HTTP endpoint for calendar-client subscription.
//!
//! Serves the generated ICS file at `/` and `/calendar.ics`; every other
//! path is a 404. No-cache headers keep subscription clients polling the
//! file instead of a stale copy.

use std::path::PathBuf;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::error::{AppError, Result};
use crate::models::ServerConfig;

/// Build the router serving `calendar_path`.
pub fn router(calendar_path: PathBuf) -> Router {
    Router::new()
        .route("/", get(serve_calendar))
        .route("/calendar.ics", get(serve_calendar))
        .with_state(calendar_path)
}

/// Bind and serve until the process is interrupted.
pub async fn run(config: &ServerConfig, calendar_path: PathBuf) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Server(format!("cannot bind {addr}: {e}")))?;
    log::info!("Serving calendar at http://{addr}/calendar.ics");

    axum::serve(listener, router(calendar_path))
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;
    Ok(())
}

async fn serve_calendar(State(path): State<PathBuf>) -> impl IntoResponse {
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            log::warn!("Calendar file {} unavailable: {e}", path.display());
            (StatusCode::NOT_FOUND, "calendar not generated yet\n").into_response()
        }
    }
}
