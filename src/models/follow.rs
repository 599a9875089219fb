// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status stored on an existing follow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowStatus {
    Requested,
    Following,
    Denied,
}

/// Edge state as seen by the state machine. `None` means no edge row
/// exists for the ordered pair, which is distinct from `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeState {
    #[serde(rename = "NOT_FOLLOWING")]
    None,
    Requested,
    Following,
    Denied,
}

impl EdgeState {
    pub fn status(self) -> Option<FollowStatus> {
        match self {
            EdgeState::None => None,
            EdgeState::Requested => Some(FollowStatus::Requested),
            EdgeState::Following => Some(FollowStatus::Following),
            EdgeState::Denied => Some(FollowStatus::Denied),
        }
    }

    pub fn is_following(self) -> bool {
        self == EdgeState::Following
    }
}

impl From<FollowStatus> for EdgeState {
    fn from(status: FollowStatus) -> Self {
        Some(status).into()
    }
}

impl From<Option<FollowStatus>> for EdgeState {
    fn from(status: Option<FollowStatus>) -> Self {
        match status {
            None => EdgeState::None,
            Some(FollowStatus::Requested) => EdgeState::Requested,
            Some(FollowStatus::Following) => EdgeState::Following,
            Some(FollowStatus::Denied) => EdgeState::Denied,
        }
    }
}

/// A directed follow relationship. Unique per (follower, followed) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: String,
    pub followed_id: String,
    pub status: FollowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized follow counts, restricted to edges in FOLLOWING.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FollowCounts {
    pub follower_count: i64,
    pub followed_count: i64,
}
