// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::media::{MediaEvent, MediaReceiver};
use crate::store::Store;

/// Asynchronous media worker. Consumes upload-complete events and drives
/// media objects from PROCESSING to UPLOADED, completing the owning post
/// once its last object finishes. The configured delay models the
/// propagation window between a mutation and its visibility to readers.
pub struct MediaWorker {
    store: Arc<Store>,
    events: MediaReceiver,
    processing_delay: Duration,
}

impl MediaWorker {
    pub fn new(store: Arc<Store>, events: MediaReceiver, processing_delay: Duration) -> Self {
        Self {
            store,
            events,
            processing_delay,
        }
    }

    pub async fn run(mut self) {
        info!(
            delay_ms = self.processing_delay.as_millis() as u64,
            "media worker started"
        );
        while let Some(event) = self.events.recv().await {
            match event {
                MediaEvent::Uploaded { media_id } => {
                    if !self.processing_delay.is_zero() {
                        tokio::time::sleep(self.processing_delay).await;
                    }
                    match self.store.posts.finish_processing(&media_id).await {
                        Ok(Some(post)) => {
                            info!(media_id = %media_id, post_id = %post.post_id, "media uploaded, post completed");
                        }
                        Ok(None) => {
                            debug!(media_id = %media_id, "media uploaded, post still pending");
                        }
                        Err(e) => {
                            error!(media_id = %media_id, "failed to finish media processing: {}", e);
                            if let Err(e) = self.store.posts.fail_media(&media_id).await {
                                error!(media_id = %media_id, "failed to mark media errored: {}", e);
                            }
                        }
                    }
                }
            }
        }
        info!("media worker stopped, event channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{media_channel, MediaPipeline, NewMediaSpec, SignedUrlIssuer};
    use crate::models::{MediaStatus, MediaType, PostStatus};

    #[tokio::test]
    async fn worker_completes_post_after_upload_signal() {
        let store = Arc::new(Store::new());
        store.users.create("u1", "u1").await.unwrap();
        let (tx, rx) = media_channel();
        let pipeline = MediaPipeline::new(
            store.clone(),
            Arc::new(SignedUrlIssuer::new("https://uploads.test/media")),
            tx,
        );
        let worker = MediaWorker::new(store.clone(), rx, Duration::from_millis(0));
        let handle = tokio::spawn(worker.run());

        let (post, media) = pipeline
            .add_post(
                "u1",
                "p1",
                None,
                vec![NewMediaSpec {
                    media_id: "m1".to_string(),
                    media_type: MediaType::Image,
                }],
            )
            .await
            .unwrap();
        assert_eq!(post.status, PostStatus::Pending);
        assert!(media[0].upload_url.is_some());

        pipeline.upload_complete("m1").await.unwrap();

        // poll for eventual completion, mirroring how clients observe it
        let mut status = store.posts.get_post("p1").await.unwrap().status;
        for _ in 0..50 {
            if status == PostStatus::Completed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            status = store.posts.get_post("p1").await.unwrap().status;
        }
        assert_eq!(status, PostStatus::Completed);
        assert_eq!(
            store.posts.get_media("m1").await.unwrap().media_status,
            MediaStatus::Uploaded
        );

        drop(pipeline);
        handle.abort();
    }
}
