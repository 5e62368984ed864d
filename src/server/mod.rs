//! The event API server.
//!
//! Thin HTTP layer over [`crate::api`] and an [`EventStore`]: the monitor's
//! HTTP sink POSTs here, dashboards poll the query routes or subscribe to
//! the 2-second SSE snapshot stream. All validation lives in `api`; a
//! rejected payload never touches the store.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::{Stream, StreamExt};

use crate::api::{self, ApiError, EventLog, EventPayload};
use crate::store::EventStore;

/// Interval between SSE snapshots.
pub const STREAM_INTERVAL: Duration = Duration::from_secs(2);

/// Shared state for the API routes.
#[derive(Clone)]
pub struct AppState {
    /// Where received events are recorded.
    pub store: Arc<dyn EventStore>,
    /// Shared secret required on submissions.
    pub secret: String,
}

/// Builds the API router.
///
/// Routes: `POST /api/event`, `GET /api/events`, `GET /api/stats`,
/// `POST /api/reset`, `GET /stream`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/event", post(submit_event))
        .route("/api/events", get(list_events))
        .route("/api/stats", get(stats))
        .route("/api/reset", post(reset))
        .route("/stream", get(stream))
        .with_state(state)
}

type ApiResponse = (StatusCode, Json<serde_json::Value>);

fn reject(err: ApiError) -> ApiResponse {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(json!({ "error": err.to_string() })))
}

fn storage_failure(context: &str, err: &crate::store::StorageError) -> ApiResponse {
    tracing::error!(context, error = %err, "storage failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "storage failure" })),
    )
}

async fn submit_event(
    State(state): State<AppState>,
    Json(payload): Json<EventPayload>,
) -> ApiResponse {
    if let Err(e) = api::authorize(&payload, &state.secret) {
        return reject(e);
    }
    let event = match api::parse_event(&payload) {
        Ok(event) => event,
        Err(e) => return reject(e),
    };

    match state.store.insert(event) {
        Ok(row) => {
            tracing::info!(kind = event.kind.as_str(), id = row.id, "event recorded");
            (
                StatusCode::OK,
                Json(json!({ "status": api::recorded_message(event.kind) })),
            )
        }
        Err(e) => storage_failure("insert", &e),
    }
}

async fn list_events(State(state): State<AppState>) -> ApiResponse {
    match api::snapshot(state.store.as_ref()) {
        Ok(log) => (
            StatusCode::OK,
            Json(serde_json::to_value(log).unwrap_or_default()),
        ),
        Err(e) => storage_failure("snapshot", &e),
    }
}

async fn stats(State(state): State<AppState>) -> ApiResponse {
    let bells = state.store.count(crate::EventKind::Bell);
    let intrusions = state.store.count(crate::EventKind::Intrusion);
    match (bells, intrusions) {
        (Ok(b), Ok(i)) => (
            StatusCode::OK,
            Json(json!({ "bell_events": b, "intrus_events": i })),
        ),
        (Err(e), _) | (_, Err(e)) => storage_failure("count", &e),
    }
}

async fn reset(State(state): State<AppState>) -> ApiResponse {
    match state.store.clear() {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "reset" }))),
        Err(e) => storage_failure("clear", &e),
    }
}

async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let snapshots = IntervalStream::new(tokio::time::interval(STREAM_INTERVAL)).map(move |_| {
        let log = api::snapshot(state.store.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "snapshot failed; streaming empty log");
            EventLog {
                bell: false,
                intrus: false,
                bell_events: Vec::new(),
                intrus_events: Vec::new(),
            }
        });
        Ok(SseEvent::default()
            .json_data(&log)
            .unwrap_or_else(|_| SseEvent::default()))
    });

    Sse::new(snapshots).keep_alive(KeepAlive::default())
}
