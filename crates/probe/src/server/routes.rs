use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use http::{header, StatusCode};
use std::sync::Arc;

use crate::readiness::{ReadinessEvaluator, ReadinessResult};

fn plain_text(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

/// Liveness handler. Succeeds as long as the process can answer HTTP.
pub async fn live() -> Response {
    plain_text(StatusCode::OK, "ok\n".to_string())
}

/// Readiness handler. One fresh evaluation per request, nothing cached.
pub async fn ready(State(evaluator): State<Arc<ReadinessEvaluator>>) -> Response {
    match evaluator.evaluate().await {
        ReadinessResult::Ready => plain_text(StatusCode::OK, "ok\n".to_string()),
        ReadinessResult::NotReady(reason) => plain_text(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("not ok, err:\n{}\n", reason),
        ),
    }
}
