// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::{envelope, Viewer};
use crate::api::AppState;
use crate::models::PrivacyStatus;
use crate::store::StoreError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_id: Option<String>,
    pub username: String,
}

/// Register a user record. Identity issuance itself belongs to the
/// external identity provider; this only creates the engine-side record.
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    if request.username.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "username must not be empty"})),
        );
    }
    let user_id = request
        .user_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    match state.store.users.create(&user_id, &request.username).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({
                "userId": user.user_id,
                "username": user.username,
                "privacyStatus": user.privacy_status,
                "followCountsHidden": user.follow_counts_hidden,
            })),
        ),
        Err(StoreError::DuplicateUser(id)) => (
            StatusCode::CONFLICT,
            Json(json!({"error": format!("user already exists: {}", id)})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        ),
    }
}

/// The caller's own profile projection.
pub async fn get_self(State(state): State<AppState>, Viewer(viewer): Viewer) -> impl IntoResponse {
    debug!(viewer = %viewer, "resolving self");
    envelope("self", state.gateway.get_user(&viewer, &viewer).await)
}

/// Another user's profile projection, gated per viewer.
pub async fn get_user(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    debug!(viewer = %viewer, target = %user_id, "resolving user");
    envelope("user", state.gateway.get_user(&viewer, &user_id).await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPrivacyRequest {
    pub privacy_status: PrivacyStatus,
}

pub async fn set_privacy_status(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Json(request): Json<SetPrivacyRequest>,
) -> impl IntoResponse {
    match state
        .store
        .users
        .set_privacy_status(&viewer, request.privacy_status)
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "data": {
                    "setUserDetails": {
                        "userId": user.user_id,
                        "privacyStatus": user.privacy_status,
                        "followCountsHidden": user.follow_counts_hidden,
                    }
                }
            })),
        ),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": e.to_string()})),
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetFollowCountsHiddenRequest {
    pub value: bool,
}

pub async fn set_follow_counts_hidden(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Json(request): Json<SetFollowCountsHiddenRequest>,
) -> impl IntoResponse {
    match state
        .store
        .users
        .set_follow_counts_hidden(&viewer, request.value)
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "data": {
                    "setUserDetails": {
                        "userId": user.user_id,
                        "privacyStatus": user.privacy_status,
                        "followCountsHidden": user.follow_counts_hidden,
                    }
                }
            })),
        ),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": e.to_string()})),
        ),
    }
}
