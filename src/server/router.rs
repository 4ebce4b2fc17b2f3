use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use kinship_friend_requests::FriendError;
use kinship_graph_store::StoreError;
use kinship_recommender::RecommendError;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::metrics;

mod friends;
mod recommendations;
mod users;

use super::state::ServeState;

pub fn build_router() -> Router<ServeState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/livez", get(live_handler))
        .route("/readyz", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .merge(users::router())
        .merge(friends::router())
        .merge(recommendations::router())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Kinship server is running" }))
}

async fn health_handler(State(state): State<ServeState>) -> Json<Value> {
    let snapshot = state.health().snapshot();
    Json(json!({
        "status": "ok",
        "ready": snapshot.ready,
        "live": snapshot.live,
        "last_ready_check_ts": snapshot.last_ready_check,
        "last_error": snapshot.last_error,
    }))
}

async fn live_handler(State(state): State<ServeState>) -> impl IntoResponse {
    let snapshot = state.health().snapshot();
    let status = if snapshot.live {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "live": snapshot.live,
            "ready": snapshot.ready,
        })),
    )
}

async fn ready_handler(State(state): State<ServeState>) -> impl IntoResponse {
    let snapshot = state.health().snapshot();
    let status = if snapshot.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "ready": snapshot.ready,
            "last_ready_check_ts": snapshot.last_ready_check,
            "last_error": snapshot.last_error,
        })),
    )
}

async fn metrics_handler() -> Response {
    metrics::register_metrics();
    metrics::encode_registry(metrics::global_registry())
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}

pub(crate) fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Conflict { .. } => StatusCode::CONFLICT,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub(crate) fn store_error_response(err: StoreError) -> Response {
    error_response(store_status(&err), err.to_string())
}

pub(crate) fn friend_error_response(err: FriendError) -> Response {
    let status = match &err {
        FriendError::SelfRelation => StatusCode::BAD_REQUEST,
        FriendError::DuplicateRequest | FriendError::AlreadyFriends => StatusCode::CONFLICT,
        FriendError::NoPendingRequest | FriendError::NotFriends => StatusCode::NOT_FOUND,
        FriendError::UnknownUser(_) => StatusCode::NOT_FOUND,
        FriendError::Store(inner) => store_status(inner),
    };
    error_response(status, err.to_string())
}

pub(crate) fn recommend_error_response(err: RecommendError) -> Response {
    let status = match &err {
        RecommendError::NotFound(_) => StatusCode::NOT_FOUND,
        RecommendError::Store(inner) => store_status(inner),
    };
    error_response(status, err.to_string())
}
