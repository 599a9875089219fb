// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post lifecycle. A post with media starts PENDING and reaches COMPLETED
/// once every media object has been uploaded and processed; a text-only
/// post is COMPLETED from creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Pending,
    Completed,
    Error,
    Deleted,
}

/// Media object lifecycle. The upload URL exists only while
/// AWAITING_UPLOAD; the storage collaborator signals completion
/// out-of-band, after which the worker drives PROCESSING -> UPLOADED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    AwaitingUpload,
    Processing,
    Uploaded,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub post_id: String,
    pub owner_id: String,
    pub text: Option<String>,
    pub status: PostStatus,
    pub media_ids: Vec<String>,
    /// Users who have viewed this post. Owner-only field; the gateway
    /// never projects it for any other viewer.
    pub viewed_by: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaObjectRecord {
    pub media_id: String,
    pub post_id: String,
    pub owner_id: String,
    pub media_type: MediaType,
    pub media_status: MediaStatus,
    pub upload_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
