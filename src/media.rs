// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Post creation and the media upload lifecycle. Upload URL signing and
//! blob storage live in an external collaborator; this module only talks
//! to it through the `UploadUrlIssuer` seam and the upload-complete
//! callback, then hands finished uploads to the async worker.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{MediaObjectRecord, MediaStatus, MediaType, PostRecord, PostStatus};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("media pipeline unavailable")]
    PipelineClosed,
    #[error("upload url issuance failed: {0}")]
    Issuer(String),
}

/// Events handed to the media worker.
#[derive(Debug)]
pub enum MediaEvent {
    Uploaded { media_id: String },
}

pub type MediaSender = mpsc::UnboundedSender<MediaEvent>;
pub type MediaReceiver = mpsc::UnboundedReceiver<MediaEvent>;

pub fn media_channel() -> (MediaSender, MediaReceiver) {
    mpsc::unbounded_channel()
}

/// Seam to the storage collaborator that signs short-lived upload URLs.
#[async_trait]
pub trait UploadUrlIssuer: Send + Sync {
    async fn issue(&self, media_id: &str) -> anyhow::Result<String>;
}

/// Default issuer: stamps a signed-looking URL under the configured base.
/// Real signing happens in the storage service; the engine only needs an
/// opaque URL to disclose to the owner.
pub struct SignedUrlIssuer {
    base: String,
}

impl SignedUrlIssuer {
    pub fn from_config() -> Self {
        Self {
            base: Config::get().media.upload_url_base.clone(),
        }
    }

    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

#[async_trait]
impl UploadUrlIssuer for SignedUrlIssuer {
    async fn issue(&self, media_id: &str) -> anyhow::Result<String> {
        Ok(format!(
            "{}/{}?sig={}",
            self.base,
            media_id,
            Uuid::new_v4().simple()
        ))
    }
}

/// Requested media attachment on a new post.
#[derive(Debug, Clone)]
pub struct NewMediaSpec {
    pub media_id: String,
    pub media_type: MediaType,
}

pub struct MediaPipeline {
    store: Arc<Store>,
    issuer: Arc<dyn UploadUrlIssuer>,
    events: MediaSender,
}

impl MediaPipeline {
    pub fn new(store: Arc<Store>, issuer: Arc<dyn UploadUrlIssuer>, events: MediaSender) -> Self {
        Self {
            store,
            issuer,
            events,
        }
    }

    /// Create a post with its media objects in AWAITING_UPLOAD, returning
    /// the upload URLs for the owner. A post with no media is COMPLETED
    /// immediately; otherwise it stays PENDING until the worker finishes
    /// every upload.
    pub async fn add_post(
        &self,
        owner_id: &str,
        post_id: &str,
        text: Option<String>,
        media: Vec<NewMediaSpec>,
    ) -> Result<(PostRecord, Vec<MediaObjectRecord>), MediaError> {
        if post_id.is_empty() {
            return Err(MediaError::InvalidArgument("postId must not be empty".to_string()));
        }
        if text.is_none() && media.is_empty() {
            return Err(MediaError::InvalidArgument(
                "post must have text or at least one media object".to_string(),
            ));
        }
        self.store.users.require(owner_id).await?;

        let now = Utc::now();
        let mut objects = Vec::with_capacity(media.len());
        for spec in &media {
            if spec.media_id.is_empty() {
                return Err(MediaError::InvalidArgument(
                    "mediaId must not be empty".to_string(),
                ));
            }
            let upload_url = self
                .issuer
                .issue(&spec.media_id)
                .await
                .map_err(|e| MediaError::Issuer(e.to_string()))?;
            objects.push(MediaObjectRecord {
                media_id: spec.media_id.clone(),
                post_id: post_id.to_string(),
                owner_id: owner_id.to_string(),
                media_type: spec.media_type,
                media_status: MediaStatus::AwaitingUpload,
                upload_url: Some(upload_url),
                created_at: now,
            });
        }

        let post = PostRecord {
            post_id: post_id.to_string(),
            owner_id: owner_id.to_string(),
            text,
            status: if objects.is_empty() {
                PostStatus::Completed
            } else {
                PostStatus::Pending
            },
            media_ids: objects.iter().map(|m| m.media_id.clone()).collect(),
            viewed_by: Vec::new(),
            created_at: now,
        };

        self.store.posts.add_post(post.clone(), objects.clone()).await?;
        info!(
            owner = owner_id,
            post_id = post_id,
            media_count = objects.len(),
            "post created"
        );
        Ok((post, objects))
    }

    /// Out-of-band signal from the storage collaborator that the blob for
    /// `media_id` has landed. Moves the object to PROCESSING and enqueues
    /// it for the worker; readers may observe the intermediate state.
    pub async fn upload_complete(&self, media_id: &str) -> Result<MediaObjectRecord, MediaError> {
        let object = self.store.posts.begin_processing(media_id).await?;
        self.events
            .send(MediaEvent::Uploaded {
                media_id: media_id.to_string(),
            })
            .map_err(|_| MediaError::PipelineClosed)?;
        debug!(media_id = media_id, "upload complete, queued for processing");
        Ok(object)
    }
}
