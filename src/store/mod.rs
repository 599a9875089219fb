// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod users;
pub mod relationships;
pub mod posts;

pub use relationships::RelationshipStore;
pub use posts::PostStore;
pub use users::UserStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("user already exists: {0}")]
    DuplicateUser(String),
    #[error("post not found: {0}")]
    PostNotFound(String),
    #[error("post already exists: {0}")]
    DuplicatePost(String),
    #[error("media object not found: {0}")]
    MediaNotFound(String),
    #[error("media object {0} is in state {1:?}, cannot apply transition")]
    InvalidMediaState(String, crate::models::MediaStatus),
}

/// In-memory authoritative state, one sub-store per aggregate. Each
/// sub-store serializes its own writes; the relationship store commits an
/// edge change and its count delta under a single guard.
#[derive(Default)]
pub struct Store {
    pub users: UserStore,
    pub graph: RelationshipStore,
    pub posts: PostStore,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}
