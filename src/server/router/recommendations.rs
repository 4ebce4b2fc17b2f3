use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use kinship_core_types::UserId;
use kinship_recommender::CandidateUser;
use serde::Serialize;
use tracing::{instrument, warn};

use super::{error_response, recommend_error_response};
use crate::server::ServeState;

pub(crate) fn router() -> Router<ServeState> {
    Router::new().route(
        "/api/users/:user_id/recommendations",
        get(recommendations_handler),
    )
}

#[derive(Serialize)]
struct RecommendationsResponse {
    success: bool,
    recommendations: Vec<CandidateUser>,
}

#[instrument(name = "kinship.recommendations", skip(state))]
async fn recommendations_handler(
    State(state): State<ServeState>,
    Path(user_id): Path<String>,
) -> Response {
    let subject = UserId::from(user_id);
    let pending = state.recommender.recommend(&subject);
    match tokio::time::timeout(state.request_timeout, pending).await {
        Ok(Ok(recommendations)) => Json(RecommendationsResponse {
            success: true,
            recommendations,
        })
        .into_response(),
        Ok(Err(err)) => recommend_error_response(err),
        Err(_) => {
            warn!(user = %subject, timeout_ms = state.request_timeout.as_millis() as u64, "recommendation timed out");
            error_response(StatusCode::GATEWAY_TIMEOUT, "Recommendation timed out")
        }
    }
}
