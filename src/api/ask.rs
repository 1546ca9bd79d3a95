//! POST /ask handler

use axum::extract::State;
use tracing::info;
use validator::Validate;

use super::state::AppState;
use super::types::{ApiError, AskRequest, AskResponse, Json};

/// Run one query through the response pipeline.
///
/// Malformed requests are the only error path; every pipeline outcome,
/// including blocked content and degraded answers, returns 200.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let query = request.into_query();

    for attachment in &query.attachments {
        attachment
            .validate()
            .map_err(|e| ApiError::bad_request(e.to_string()).with_param("attachments"))?;
    }

    let conversation_id = query.conversation_id.clone();

    info!(
        conversation_id = %conversation_id,
        multimodal = query.is_multimodal(),
        stress_level = query.stress_level.as_str(),
        "Processing query"
    );

    let response = state.pipeline.process(&query).await;

    Ok(Json(AskResponse::from_pipeline(conversation_id, response)))
}
