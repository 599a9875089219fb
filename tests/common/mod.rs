// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use social_visibility_engine::follow::FollowService;
use social_visibility_engine::gateway::VisibilityGateway;
use social_visibility_engine::media::{media_channel, MediaPipeline, NewMediaSpec, SignedUrlIssuer};
use social_visibility_engine::models::{MediaType, PostStatus};
use social_visibility_engine::store::Store;
use social_visibility_engine::worker::MediaWorker;

/// Full engine wired the way the binary wires it, with a fast worker.
pub struct Engine {
    pub store: Arc<Store>,
    pub follows: FollowService,
    pub gateway: VisibilityGateway,
    pub media: MediaPipeline,
}

impl Engine {
    pub fn start() -> Self {
        let store = Arc::new(Store::new());
        let (tx, rx) = media_channel();
        let worker = MediaWorker::new(store.clone(), rx, Duration::from_millis(5));
        tokio::spawn(worker.run());
        Self {
            follows: FollowService::new(store.clone()),
            gateway: VisibilityGateway::new(store.clone()),
            media: MediaPipeline::new(
                store.clone(),
                Arc::new(SignedUrlIssuer::new("https://uploads.test/media")),
                tx,
            ),
            store,
        }
    }

    pub async fn register(&self, user_id: &str) {
        self.store.users.create(user_id, user_id).await.unwrap();
    }

    /// Add a single-image post, signal upload completion, and wait for the
    /// worker to complete the post, the way clients poll for propagation.
    pub async fn add_completed_media_post(&self, owner: &str, post_id: &str, media_id: &str) {
        let (_, media) = self
            .media
            .add_post(
                owner,
                post_id,
                None,
                vec![NewMediaSpec {
                    media_id: media_id.to_string(),
                    media_type: MediaType::Image,
                }],
            )
            .await
            .unwrap();
        assert!(media[0].upload_url.is_some());
        self.media.upload_complete(media_id).await.unwrap();
        self.wait_for_completed(post_id).await;
    }

    pub async fn wait_for_completed(&self, post_id: &str) {
        for _ in 0..200 {
            if self.store.posts.get_post(post_id).await.unwrap().status == PostStatus::Completed {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("post {} never completed", post_id);
    }
}
