use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domains::content::ContentGenerationError;
use crate::server::app::AxumAppState;

/// Body of `POST /api/content/generator`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Missing is treated like blank
    #[serde(default)]
    pub topic_text: Option<String>,
}

/// Generate post drafts for a topic
///
/// Responds with the model's JSON array unchanged. A body that is absent or
/// not a JSON object with a string `topicText` counts as a missing topic.
pub async fn generate_content_handler(
    Extension(state): Extension<AxumAppState>,
    request: Result<Json<GenerateContentRequest>, JsonRejection>,
) -> Result<Json<Vec<Value>>, ContentGenerationError> {
    let topic_text = match request {
        Ok(Json(request)) => request.topic_text.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable content generator body");
            String::new()
        }
    };
    let drafts = state.content.generate(&topic_text).await?;

    tracing::info!(drafts = drafts.len(), "Content generated");
    Ok(Json(drafts))
}

impl IntoResponse for ContentGenerationError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Error generating content");
        }

        let message = self.to_string();
        let body = match self {
            ContentGenerationError::Upstream { status, details } => json!({
                "message": message,
                "upstreamStatus": status,
                "details": details,
            }),
            ContentGenerationError::MalformedOutput { raw_output } => json!({
                "message": message,
                "rawOutput": raw_output,
            }),
            _ => json!({ "message": message }),
        };

        (status, Json(body)).into_response()
    }
}
