// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::{envelope, Viewer};
use crate::api::AppState;
use crate::media::{MediaError, NewMediaSpec};
use crate::models::{MediaStatus, MediaType, PostStatus};
use crate::store::StoreError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSpecRequest {
    pub media_id: Option<String>,
    pub media_type: MediaType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPostRequest {
    pub post_id: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub media_objects: Vec<MediaSpecRequest>,
}

fn media_error(err: MediaError) -> Response {
    let status = match &err {
        MediaError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        MediaError::Store(StoreError::DuplicatePost(_)) => StatusCode::CONFLICT,
        MediaError::Store(StoreError::UserNotFound(_))
        | MediaError::Store(StoreError::MediaNotFound(_))
        | MediaError::Store(StoreError::PostNotFound(_)) => StatusCode::NOT_FOUND,
        MediaError::Store(StoreError::InvalidMediaState(_, _)) => StatusCode::BAD_REQUEST,
        MediaError::PipelineClosed => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({"error": err.to_string()}))).into_response()
}

/// Create a post with its media objects. The response carries the signed
/// upload URLs; this is the only place they are ever disclosed, and only
/// to the owner making the call.
pub async fn add_post(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Json(request): Json<AddPostRequest>,
) -> Response {
    let post_id = request
        .post_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let media: Vec<NewMediaSpec> = request
        .media_objects
        .into_iter()
        .map(|m| NewMediaSpec {
            media_id: m.media_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            media_type: m.media_type,
        })
        .collect();
    debug!(viewer = %viewer, post_id = %post_id, media_count = media.len(), "addPost");

    match state
        .media
        .add_post(&viewer, &post_id, request.text, media)
        .await
    {
        Ok((post, objects)) => Json(json!({
            "data": {
                "addPost": {
                    "postId": post.post_id,
                    "postedBy": post.owner_id,
                    "postStatus": post.status,
                    "text": post.text,
                    "mediaObjects": objects
                        .iter()
                        .map(|m| json!({
                            "mediaId": m.media_id,
                            "mediaType": m.media_type,
                            "mediaStatus": m.media_status,
                            "uploadUrl": m.upload_url,
                        }))
                        .collect::<Vec<_>>(),
                }
            }
        }))
        .into_response(),
        Err(e) => media_error(e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsQuery {
    pub user_id: Option<String>,
    pub status: Option<PostStatus>,
}

pub async fn get_posts(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(query): Query<PostsQuery>,
) -> impl IntoResponse {
    envelope(
        "getPosts",
        state
            .gateway
            .get_posts(&viewer, query.user_id.as_deref(), query.status)
            .await,
    )
}

pub async fn get_post(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(post_id): Path<String>,
) -> impl IntoResponse {
    envelope("getPost", state.gateway.get_post(&viewer, &post_id).await)
}

/// Post with its viewed-by list. The list is a field-scoped resolution:
/// a non-owner still gets the post, with `viewedBy` nulled and a single
/// error entry attached.
pub async fn get_post_viewed_by(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(post_id): Path<String>,
) -> impl IntoResponse {
    let post = state.gateway.get_post(&viewer, &post_id).await;
    let Some(post) = post.data else {
        return Json(json!({ "data": { "getPost": null } }));
    };
    let viewed = state.gateway.viewed_by(&viewer, &post_id).await;

    let mut post_value = serde_json::to_value(&post).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut post_value {
        let viewed_value = match &viewed.data {
            Some(page) => serde_json::to_value(page).unwrap_or(Value::Null),
            None => Value::Null,
        };
        map.insert("viewedBy".to_string(), viewed_value);
    }

    if viewed.is_denied() {
        Json(json!({ "data": { "getPost": post_value }, "errors": viewed.errors }))
    } else {
        Json(json!({ "data": { "getPost": post_value } }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaObjectsQuery {
    pub user_id: Option<String>,
    pub media_status: Option<MediaStatus>,
}

pub async fn get_media_objects(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(query): Query<MediaObjectsQuery>,
) -> impl IntoResponse {
    envelope(
        "getMediaObjects",
        state
            .gateway
            .get_media_objects(&viewer, query.user_id.as_deref(), query.media_status)
            .await,
    )
}

/// Callback from the storage collaborator once a blob has landed.
pub async fn upload_complete(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> Response {
    debug!(media_id = %media_id, "upload complete signal");
    match state.media.upload_complete(&media_id).await {
        Ok(object) => Json(json!({
            "mediaId": object.media_id,
            "mediaStatus": object.media_status,
        }))
        .into_response(),
        Err(e) => media_error(e),
    }
}
