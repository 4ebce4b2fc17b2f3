use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use kinship_core_types::{UserId, UserProfile};
use kinship_friend_requests::Relation;
use kinship_graph_store::GraphStore;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use super::{friend_error_response, store_error_response};
use crate::server::ServeState;

pub(crate) fn router() -> Router<ServeState> {
    Router::new()
        .route("/api/users/:user_id/friends", get(list_handler))
        .route("/api/users/:user_id/friends/:other_id", delete(unfriend_handler))
        .route(
            "/api/users/:user_id/friend-requests/:other_id",
            post(send_handler).delete(decline_handler),
        )
        .route(
            "/api/users/:user_id/friend-requests/:other_id/accept",
            post(accept_handler),
        )
        .route(
            "/api/users/:user_id/sent-requests/:other_id",
            delete(cancel_handler),
        )
        .route("/api/users/:user_id/relation/:other_id", get(relation_handler))
}

#[derive(Serialize)]
struct FriendsResponse {
    success: bool,
    friends: Vec<UserProfile>,
    friend_requests: Vec<UserProfile>,
}

#[instrument(name = "kinship.friends.list", skip(state))]
async fn list_handler(State(state): State<ServeState>, Path(user_id): Path<String>) -> Response {
    let user = match state.store.get_user(&UserId::from(user_id)).await {
        Ok(user) => user,
        Err(err) => return store_error_response(err),
    };

    let wanted: BTreeSet<UserId> = user
        .friends
        .iter()
        .chain(user.friend_requests.iter())
        .cloned()
        .collect();
    let resolved = match state.store.get_users(&wanted).await {
        Ok(resolved) => resolved,
        Err(err) => return store_error_response(err),
    };

    let friends = user
        .friends
        .iter()
        .filter_map(|id| resolved.get(id))
        .map(|u| u.profile())
        .collect();
    let friend_requests = user
        .friend_requests
        .iter()
        .filter_map(|id| resolved.get(id))
        .map(|u| u.profile())
        .collect();

    Json(FriendsResponse {
        success: true,
        friends,
        friend_requests,
    })
    .into_response()
}

#[instrument(name = "kinship.friends.request", skip(state))]
async fn send_handler(
    State(state): State<ServeState>,
    Path((user_id, target_id)): Path<(String, String)>,
) -> Response {
    match state
        .friend_requests
        .send_request(&UserId::from(user_id), &UserId::from(target_id))
        .await
    {
        Ok(()) => done(StatusCode::CREATED, "Friend request sent"),
        Err(err) => friend_error_response(err),
    }
}

#[instrument(name = "kinship.friends.accept", skip(state))]
async fn accept_handler(
    State(state): State<ServeState>,
    Path((user_id, requester_id)): Path<(String, String)>,
) -> Response {
    match state
        .friend_requests
        .accept_request(&UserId::from(user_id), &UserId::from(requester_id))
        .await
    {
        Ok(()) => done(StatusCode::OK, "Friend request accepted"),
        Err(err) => friend_error_response(err),
    }
}

#[instrument(name = "kinship.friends.decline", skip(state))]
async fn decline_handler(
    State(state): State<ServeState>,
    Path((user_id, requester_id)): Path<(String, String)>,
) -> Response {
    match state
        .friend_requests
        .decline_request(&UserId::from(user_id), &UserId::from(requester_id))
        .await
    {
        Ok(()) => done(StatusCode::OK, "Friend request declined"),
        Err(err) => friend_error_response(err),
    }
}

#[instrument(name = "kinship.friends.cancel", skip(state))]
async fn cancel_handler(
    State(state): State<ServeState>,
    Path((user_id, target_id)): Path<(String, String)>,
) -> Response {
    match state
        .friend_requests
        .cancel_request(&UserId::from(user_id), &UserId::from(target_id))
        .await
    {
        Ok(()) => done(StatusCode::OK, "Friend request cancelled"),
        Err(err) => friend_error_response(err),
    }
}

#[instrument(name = "kinship.friends.remove", skip(state))]
async fn unfriend_handler(
    State(state): State<ServeState>,
    Path((user_id, friend_id)): Path<(String, String)>,
) -> Response {
    match state
        .friend_requests
        .remove_friend(&UserId::from(user_id), &UserId::from(friend_id))
        .await
    {
        Ok(()) => done(StatusCode::OK, "Friend removed"),
        Err(err) => friend_error_response(err),
    }
}

#[derive(Serialize)]
struct RelationResponse {
    success: bool,
    relation: Relation,
}

#[instrument(name = "kinship.friends.relation", skip(state))]
async fn relation_handler(
    State(state): State<ServeState>,
    Path((user_id, other_id)): Path<(String, String)>,
) -> Response {
    match state
        .friend_requests
        .relation(&UserId::from(user_id), &UserId::from(other_id))
        .await
    {
        Ok(relation) => Json(RelationResponse {
            success: true,
            relation,
        })
        .into_response(),
        Err(err) => friend_error_response(err),
    }
}

fn done(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": true, "message": message }))).into_response()
}
