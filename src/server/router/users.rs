use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use kinship_core_types::{User, UserId, UserProfile};
use kinship_graph_store::{GraphStore, GraphWriter, StoreError};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{error_response, store_error_response};
use crate::server::ServeState;

pub(crate) fn router() -> Router<ServeState> {
    Router::new()
        .route("/api/users", post(register_handler))
        .route("/api/users/search", get(search_handler))
        .route("/api/users/:user_id", get(profile_handler))
}

#[derive(Deserialize)]
struct RegisterRequest {
    username: String,
    email: String,
    #[serde(default)]
    interests: Vec<String>,
}

#[derive(Serialize)]
struct ProfileResponse {
    success: bool,
    user: UserProfile,
}

#[instrument(name = "kinship.users.register", skip(state, payload))]
async fn register_handler(
    State(state): State<ServeState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };
    let user = match User::register(&payload.username, &payload.email, &payload.interests) {
        Ok(user) => user,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    match state.store.insert_user(user).await {
        Ok(stored) => {
            info!(user = %stored.id, username = %stored.username, "user registered");
            (
                StatusCode::CREATED,
                Json(ProfileResponse {
                    success: true,
                    user: stored.profile(),
                }),
            )
                .into_response()
        }
        Err(StoreError::Conflict { .. }) => {
            error_response(StatusCode::CONFLICT, "User already exists")
        }
        Err(err) => store_error_response(err),
    }
}

#[instrument(name = "kinship.users.profile", skip(state))]
async fn profile_handler(
    State(state): State<ServeState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.store.get_user(&UserId::from(user_id)).await {
        Ok(user) => Json(ProfileResponse {
            success: true,
            user: user.profile(),
        })
        .into_response(),
        Err(err) => store_error_response(err),
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    users: Vec<UserProfile>,
}

#[instrument(name = "kinship.users.search", skip(state, query))]
async fn search_handler(
    State(state): State<ServeState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let limit = state.search.clamp(query.limit);
    match state.store.search_users(&query.q, limit).await {
        Ok(users) => Json(SearchResponse {
            success: true,
            users: users.iter().map(User::profile).collect(),
        })
        .into_response(),
        Err(err) => store_error_response(err),
    }
}
