// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod user;
pub mod follow;
pub mod post;

pub use user::{PrivacyStatus, UserRecord};
pub use follow::{EdgeState, FollowCounts, FollowEdge, FollowStatus};
pub use post::{MediaObjectRecord, MediaStatus, MediaType, PostRecord, PostStatus};
