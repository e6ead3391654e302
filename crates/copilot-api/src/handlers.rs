//! HTTP handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use copilot_core::{FailureReason, Recorder};

use crate::ApiState;

/// Error body, same shape for every failure.
#[derive(serde::Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: msg.to_string(),
        }),
    )
        .into_response()
}

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> Response {
    let exporter = &state.exporter;
    exporter.metrics().counters.request_received();

    match exporter.refresh().await {
        Ok(rows) => debug!(rows, "refresh complete"),
        Err(e) => {
            error!(error = %e, "metrics refresh rejected");
            return error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    match exporter.metrics().render() {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, exporter.metrics().content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to render exposition");
            error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /test_metrics
pub async fn test_metrics(State(state): State<ApiState>) -> &'static str {
    let counters = &state.exporter.metrics().counters;
    counters.request_received();
    counters.upstream_failed(FailureReason::Test);
    "Test metrics incremented"
}

/// GET /healthz
pub async fn health() -> &'static str {
    "ok"
}
