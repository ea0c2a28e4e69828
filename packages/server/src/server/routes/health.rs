use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AxumAppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    completion_configured: bool,
}

/// Health check endpoint
///
/// Always 200 while the process is serving; reports whether a completion
/// credential is configured so operators can spot a misconfigured deploy.
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            completion_configured: state.content.is_configured(),
        }),
    )
}
