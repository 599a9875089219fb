// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use super::{envelope, Viewer};
use crate::api::AppState;
use crate::follow::TransitionError;

fn transition_error(err: TransitionError) -> Response {
    let status = match &err {
        TransitionError::Forbidden => StatusCode::FORBIDDEN,
        TransitionError::NotFound(_) => StatusCode::NOT_FOUND,
        TransitionError::InvalidArgument(_) | TransitionError::InvalidTransition(_) => {
            StatusCode::BAD_REQUEST
        }
    };
    (status, Json(json!({"error": err.to_string()}))).into_response()
}

/// Follow (or request to follow) another user.
pub async fn follow_user(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(user_id): Path<String>,
) -> Response {
    debug!(viewer = %viewer, target = %user_id, "followUser");
    match state.follows.follow_user(&viewer, &user_id).await {
        Ok(status) => Json(json!({
            "data": { "followUser": { "userId": user_id, "followedStatus": status } }
        }))
        .into_response(),
        Err(e) => transition_error(e),
    }
}

/// Remove the caller's follow edge toward another user, whatever its state.
pub async fn unfollow_user(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(user_id): Path<String>,
) -> Response {
    debug!(viewer = %viewer, target = %user_id, "unfollowUser");
    match state.follows.unfollow_user(&viewer, &viewer, &user_id).await {
        Ok(edge_state) => Json(json!({
            "data": { "unfollowUser": { "userId": user_id, "followedStatus": edge_state } }
        }))
        .into_response(),
        Err(e) => transition_error(e),
    }
}

/// Accept a pending follow request addressed to the caller.
pub async fn accept_follower(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(user_id): Path<String>,
) -> Response {
    debug!(viewer = %viewer, follower = %user_id, "acceptFollowerUser");
    match state
        .follows
        .accept_follower(&viewer, &user_id, &viewer)
        .await
    {
        Ok(status) => Json(json!({
            "data": { "acceptFollowerUser": { "userId": user_id, "followerStatus": status } }
        }))
        .into_response(),
        Err(e) => transition_error(e),
    }
}

/// Deny a pending follow request addressed to the caller.
pub async fn deny_follower(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(user_id): Path<String>,
) -> Response {
    debug!(viewer = %viewer, follower = %user_id, "denyFollowerUser");
    match state
        .follows
        .deny_follower(&viewer, &user_id, &viewer)
        .await
    {
        Ok(status) => Json(json!({
            "data": { "denyFollowerUser": { "userId": user_id, "followerStatus": status } }
        }))
        .into_response(),
        Err(e) => transition_error(e),
    }
}

/// Users following the target, gated by the hidden-counts setting.
pub async fn follower_users(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    envelope(
        "followerUsers",
        state.gateway.follower_users(&viewer, &user_id).await,
    )
}

/// Users the target follows, gated by the hidden-counts setting.
pub async fn followed_users(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    envelope(
        "followedUsers",
        state.gateway.followed_users(&viewer, &user_id).await,
    )
}
