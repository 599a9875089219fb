// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::StoreError;
use crate::models::{MediaObjectRecord, MediaStatus, PostRecord, PostStatus};

#[derive(Default)]
struct PostState {
    posts: HashMap<String, PostRecord>,
    media: HashMap<String, MediaObjectRecord>,
}

/// Posts and their media objects. Post completion is derived from media
/// state: a post leaves PENDING only once every media object it owns has
/// reached UPLOADED.
#[derive(Default)]
pub struct PostStore {
    state: RwLock<PostState>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_post(
        &self,
        post: PostRecord,
        media: Vec<MediaObjectRecord>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.posts.contains_key(&post.post_id) {
            return Err(StoreError::DuplicatePost(post.post_id.clone()));
        }
        for object in &media {
            state.media.insert(object.media_id.clone(), object.clone());
        }
        state.posts.insert(post.post_id.clone(), post);
        Ok(())
    }

    pub async fn get_post(&self, post_id: &str) -> Option<PostRecord> {
        self.state.read().await.posts.get(post_id).cloned()
    }

    pub async fn posts_by_user(
        &self,
        owner_id: &str,
        status: Option<PostStatus>,
    ) -> Vec<PostRecord> {
        let state = self.state.read().await;
        let mut posts: Vec<PostRecord> = state
            .posts
            .values()
            .filter(|p| p.owner_id == owner_id)
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    pub async fn get_media(&self, media_id: &str) -> Option<MediaObjectRecord> {
        self.state.read().await.media.get(media_id).cloned()
    }

    pub async fn media_by_user(
        &self,
        owner_id: &str,
        status: Option<MediaStatus>,
    ) -> Vec<MediaObjectRecord> {
        let state = self.state.read().await;
        let mut media: Vec<MediaObjectRecord> = state
            .media
            .values()
            .filter(|m| m.owner_id == owner_id)
            .filter(|m| status.map_or(true, |s| m.media_status == s))
            .cloned()
            .collect();
        media.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        media
    }

    pub async fn media_for_post(&self, post_id: &str) -> Vec<MediaObjectRecord> {
        let state = self.state.read().await;
        let Some(post) = state.posts.get(post_id) else {
            return Vec::new();
        };
        post.media_ids
            .iter()
            .filter_map(|id| state.media.get(id).cloned())
            .collect()
    }

    /// Upload completion signal from the storage collaborator:
    /// AWAITING_UPLOAD -> PROCESSING, dropping the upload URL. A repeated
    /// signal while already PROCESSING is a no-op.
    pub async fn begin_processing(&self, media_id: &str) -> Result<MediaObjectRecord, StoreError> {
        let mut state = self.state.write().await;
        let object = state
            .media
            .get_mut(media_id)
            .ok_or_else(|| StoreError::MediaNotFound(media_id.to_string()))?;
        match object.media_status {
            MediaStatus::AwaitingUpload => {
                object.media_status = MediaStatus::Processing;
                object.upload_url = None;
            }
            MediaStatus::Processing => {}
            other => return Err(StoreError::InvalidMediaState(media_id.to_string(), other)),
        }
        Ok(object.clone())
    }

    /// Worker-side completion: PROCESSING -> UPLOADED, and the owning post
    /// flips PENDING -> COMPLETED once no media object remains unfinished.
    /// Returns the post if it completed on this call.
    pub async fn finish_processing(
        &self,
        media_id: &str,
    ) -> Result<Option<PostRecord>, StoreError> {
        let mut state = self.state.write().await;
        let object = state
            .media
            .get_mut(media_id)
            .ok_or_else(|| StoreError::MediaNotFound(media_id.to_string()))?;
        match object.media_status {
            MediaStatus::Processing => object.media_status = MediaStatus::Uploaded,
            MediaStatus::Uploaded => return Ok(None),
            other => return Err(StoreError::InvalidMediaState(media_id.to_string(), other)),
        }
        let post_id = object.post_id.clone();

        let all_uploaded = {
            let post = state
                .posts
                .get(&post_id)
                .ok_or_else(|| StoreError::PostNotFound(post_id.clone()))?;
            post.media_ids.iter().all(|id| {
                state
                    .media
                    .get(id)
                    .map(|m| m.media_status == MediaStatus::Uploaded)
                    .unwrap_or(false)
            })
        };
        if !all_uploaded {
            return Ok(None);
        }

        if let Some(post) = state.posts.get_mut(&post_id) {
            if post.status == PostStatus::Pending {
                post.status = PostStatus::Completed;
                debug!(post_id = %post_id, "post completed, all media uploaded");
                return Ok(Some(post.clone()));
            }
        }
        Ok(None)
    }

    /// Mark a media object (and its still-pending post) failed.
    pub async fn fail_media(&self, media_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let object = state
            .media
            .get_mut(media_id)
            .ok_or_else(|| StoreError::MediaNotFound(media_id.to_string()))?;
        object.media_status = MediaStatus::Error;
        object.upload_url = None;
        let post_id = object.post_id.clone();
        if let Some(post) = state.posts.get_mut(&post_id) {
            if post.status == PostStatus::Pending {
                post.status = PostStatus::Error;
            }
        }
        Ok(())
    }

    /// Record that `viewer_id` has seen the post. Owner views are not
    /// recorded; repeat views are collapsed.
    pub async fn record_view(&self, post_id: &str, viewer_id: &str) {
        let mut state = self.state.write().await;
        if let Some(post) = state.posts.get_mut(post_id) {
            if post.owner_id != viewer_id && !post.viewed_by.iter().any(|v| v == viewer_id) {
                post.viewed_by.push(viewer_id.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use chrono::Utc;

    fn post(post_id: &str, owner: &str, media_ids: Vec<String>) -> PostRecord {
        PostRecord {
            post_id: post_id.to_string(),
            owner_id: owner.to_string(),
            text: None,
            status: if media_ids.is_empty() {
                PostStatus::Completed
            } else {
                PostStatus::Pending
            },
            media_ids,
            viewed_by: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn media(media_id: &str, post_id: &str, owner: &str) -> MediaObjectRecord {
        MediaObjectRecord {
            media_id: media_id.to_string(),
            post_id: post_id.to_string(),
            owner_id: owner.to_string(),
            media_type: MediaType::Image,
            media_status: MediaStatus::AwaitingUpload,
            upload_url: Some("https://uploads.localhost/media/m1".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_post_id_is_rejected() {
        let store = PostStore::new();
        store.add_post(post("p1", "u1", vec![]), vec![]).await.unwrap();
        let err = store.add_post(post("p1", "u1", vec![]), vec![]).await;
        assert!(matches!(err, Err(StoreError::DuplicatePost(_))));
    }

    #[tokio::test]
    async fn post_completes_only_after_all_media_uploaded() {
        let store = PostStore::new();
        store
            .add_post(
                post("p1", "u1", vec!["m1".to_string(), "m2".to_string()]),
                vec![media("m1", "p1", "u1"), media("m2", "p1", "u1")],
            )
            .await
            .unwrap();

        store.begin_processing("m1").await.unwrap();
        assert!(store.finish_processing("m1").await.unwrap().is_none());
        assert_eq!(
            store.get_post("p1").await.unwrap().status,
            PostStatus::Pending
        );

        store.begin_processing("m2").await.unwrap();
        let completed = store.finish_processing("m2").await.unwrap();
        assert_eq!(completed.unwrap().status, PostStatus::Completed);
    }

    #[tokio::test]
    async fn begin_processing_drops_upload_url_and_is_idempotent() {
        let store = PostStore::new();
        store
            .add_post(
                post("p1", "u1", vec!["m1".to_string()]),
                vec![media("m1", "p1", "u1")],
            )
            .await
            .unwrap();
        let object = store.begin_processing("m1").await.unwrap();
        assert_eq!(object.media_status, MediaStatus::Processing);
        assert!(object.upload_url.is_none());
        // second storage callback is tolerated
        let object = store.begin_processing("m1").await.unwrap();
        assert_eq!(object.media_status, MediaStatus::Processing);
    }

    #[tokio::test]
    async fn record_view_skips_owner_and_duplicates() {
        let store = PostStore::new();
        store.add_post(post("p1", "u1", vec![]), vec![]).await.unwrap();
        store.record_view("p1", "u1").await;
        store.record_view("p1", "u2").await;
        store.record_view("p1", "u2").await;
        assert_eq!(
            store.get_post("p1").await.unwrap().viewed_by,
            vec!["u2".to_string()]
        );
    }
}
