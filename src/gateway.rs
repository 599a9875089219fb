// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Resource visibility gateway. Every read passes through here with an
//! explicit viewer identity; the gateway resolves the edge state and
//! owner settings, asks the policy engine, and materializes the result
//! as a `Gated` envelope. Policy denials are data, never `Err`.

use serde::Serialize;
use std::sync::Arc;

use crate::models::{
    EdgeState, FollowStatus, MediaObjectRecord, MediaStatus, MediaType, PostRecord, PostStatus,
    PrivacyStatus, UserRecord,
};
use crate::policy::{can_view, Disposition, QueryShape, ResourceCategory, ViewContext};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryErrorType {
    VisibilityDenied,
    NotFound,
}

/// A field-scoped error entry, GraphQL style: it nulls the field it is
/// attached to and leaves sibling fields intact.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub path: String,
    #[serde(rename = "errorType")]
    pub error_type: QueryErrorType,
    pub message: String,
}

/// Gateway result envelope. `data: None` with empty errors is a silent
/// redaction (the field resolves to null); `data: None` with errors is a
/// loud denial. The two are deliberately distinct dispositions.
#[derive(Debug, Clone)]
pub struct Gated<T> {
    pub data: Option<T>,
    pub errors: Vec<FieldError>,
}

impl<T> Gated<T> {
    pub fn visible(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn redacted() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
        }
    }

    pub fn denied(path: &str, error_type: QueryErrorType, message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![FieldError {
                path: path.to_string(),
                error_type,
                message: message.into(),
            }],
        }
    }

    pub fn is_denied(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub username: String,
}

/// Per-viewer user projection. Counts and the hidden flag are `Option`
/// because their visibility depends on who is asking; both singular and
/// pluralized count aliases are served from the same projection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProjection {
    pub user_id: String,
    pub username: String,
    pub privacy_status: PrivacyStatus,
    pub followed_status: EdgeState,
    pub follow_counts_hidden: Option<bool>,
    pub follower_count: Option<i64>,
    pub followers_count: Option<i64>,
    pub followed_count: Option<i64>,
    pub followeds_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaProjection {
    pub media_id: String,
    pub post_id: String,
    pub media_type: MediaType,
    pub media_status: MediaStatus,
    pub upload_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostProjection {
    pub post_id: String,
    pub posted_by: String,
    pub text: Option<String>,
    pub post_status: PostStatus,
    pub media_objects: Vec<MediaProjection>,
}

pub struct VisibilityGateway {
    store: Arc<Store>,
}

impl VisibilityGateway {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    async fn context<'a>(&self, viewer_id: &'a str, owner: &'a UserRecord) -> ViewContext<'a> {
        let edge_state = self
            .store
            .graph
            .edge_state(viewer_id, &owner.user_id)
            .await;
        ViewContext {
            viewer_id,
            owner_id: &owner.user_id,
            edge_state,
            owner_privacy: owner.privacy_status,
            owner_hide_counts: owner.follow_counts_hidden,
        }
    }

    fn project_media(object: &MediaObjectRecord, is_owner: bool) -> MediaProjection {
        MediaProjection {
            media_id: object.media_id.clone(),
            post_id: object.post_id.clone(),
            media_type: object.media_type,
            media_status: object.media_status,
            // the upload URL is never disclosed to anyone but the owner
            upload_url: if is_owner {
                object.upload_url.clone()
            } else {
                None
            },
        }
    }

    async fn project_post(&self, post: &PostRecord, is_owner: bool) -> PostProjection {
        let media = self.store.posts.media_for_post(&post.post_id).await;
        PostProjection {
            post_id: post.post_id.clone(),
            posted_by: post.owner_id.clone(),
            text: post.text.clone(),
            post_status: post.status,
            media_objects: media
                .iter()
                .map(|m| Self::project_media(m, is_owner))
                .collect(),
        }
    }

    async fn summaries(&self, user_ids: Vec<String>) -> Vec<UserSummary> {
        let mut items = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            if let Some(user) = self.store.users.get(&user_id).await {
                items.push(UserSummary {
                    user_id: user.user_id,
                    username: user.username,
                });
            }
        }
        items
    }

    /// User projection for `target_id` as seen by `viewer_id`. A missing
    /// user resolves to null rather than an error, matching the silent
    /// treatment of single-resource lookups.
    pub async fn get_user(&self, viewer_id: &str, target_id: &str) -> Gated<UserProjection> {
        let Some(owner) = self.store.users.get(target_id).await else {
            return Gated::redacted();
        };
        let ctx = self.context(viewer_id, &owner).await;
        let counts_visible = can_view(
            ctx,
            ResourceCategory::ProfileCountsAndLists,
            QueryShape::SingleItem,
        ) == Disposition::Allow;
        let counts = self.store.graph.counts(target_id).await;

        Gated::visible(UserProjection {
            user_id: owner.user_id.clone(),
            username: owner.username.clone(),
            privacy_status: owner.privacy_status,
            followed_status: ctx.edge_state,
            // the flag itself is owner-only, independent of its value
            follow_counts_hidden: ctx.is_owner().then_some(owner.follow_counts_hidden),
            follower_count: counts_visible.then_some(counts.follower_count),
            followers_count: counts_visible.then_some(counts.follower_count),
            followed_count: counts_visible.then_some(counts.followed_count),
            followeds_count: counts_visible.then_some(counts.followed_count),
        })
    }

    /// Users following `target_id` (FOLLOWING edges only).
    pub async fn follower_users(
        &self,
        viewer_id: &str,
        target_id: &str,
    ) -> Gated<Page<UserSummary>> {
        self.membership_list(viewer_id, target_id, MembershipSide::Followers)
            .await
    }

    /// Users that `target_id` follows (FOLLOWING edges only).
    pub async fn followed_users(
        &self,
        viewer_id: &str,
        target_id: &str,
    ) -> Gated<Page<UserSummary>> {
        self.membership_list(viewer_id, target_id, MembershipSide::Followed)
            .await
    }

    async fn membership_list(
        &self,
        viewer_id: &str,
        target_id: &str,
        side: MembershipSide,
    ) -> Gated<Page<UserSummary>> {
        let Some(owner) = self.store.users.get(target_id).await else {
            return Gated::redacted();
        };
        let ctx = self.context(viewer_id, &owner).await;
        match can_view(ctx, ResourceCategory::ProfileCountsAndLists, QueryShape::List) {
            Disposition::Allow => {
                let ids = match side {
                    MembershipSide::Followers => {
                        self.store
                            .graph
                            .list_followers(target_id, Some(FollowStatus::Following))
                            .await
                    }
                    MembershipSide::Followed => {
                        self.store
                            .graph
                            .list_followed(target_id, Some(FollowStatus::Following))
                            .await
                    }
                };
                Gated::visible(Page {
                    items: self.summaries(ids).await,
                })
            }
            // hidden counts redact the list to null with no error
            Disposition::RedactNull => Gated::redacted(),
            Disposition::DenyError => Gated::denied(
                side.path(),
                QueryErrorType::VisibilityDenied,
                "User does not have access",
            ),
        }
    }

    /// Posts of `target_id` (defaulting to the viewer's own). Denial of a
    /// list query fails loudly and must not leak how many posts exist.
    pub async fn get_posts(
        &self,
        viewer_id: &str,
        target_id: Option<&str>,
        status: Option<PostStatus>,
    ) -> Gated<Page<PostProjection>> {
        let owner_id = target_id.unwrap_or(viewer_id);
        let Some(owner) = self.store.users.get(owner_id).await else {
            return Gated::denied(
                "getPosts",
                QueryErrorType::NotFound,
                format!("user not found: {}", owner_id),
            );
        };
        let ctx = self.context(viewer_id, &owner).await;
        match can_view(ctx, ResourceCategory::PostAndMedia, QueryShape::List) {
            Disposition::Allow => {
                let mut posts = self.store.posts.posts_by_user(owner_id, status).await;
                if !ctx.is_owner() {
                    // non-owners only ever see completed posts
                    posts.retain(|p| p.status == PostStatus::Completed);
                }
                let mut items = Vec::with_capacity(posts.len());
                for post in &posts {
                    items.push(self.project_post(post, ctx.is_owner()).await);
                }
                Gated::visible(Page { items })
            }
            // post/media denial is always loud on list queries
            Disposition::RedactNull | Disposition::DenyError => Gated::denied(
                "getPosts",
                QueryErrorType::VisibilityDenied,
                "User does not have access",
            ),
        }
    }

    /// Single post by id. Missing and privacy-redacted posts are
    /// indistinguishable: both resolve to null without an error. A
    /// successful non-owner view is recorded on the post's viewed-by list.
    pub async fn get_post(&self, viewer_id: &str, post_id: &str) -> Gated<PostProjection> {
        let Some(post) = self.store.posts.get_post(post_id).await else {
            return Gated::redacted();
        };
        let Some(owner) = self.store.users.get(&post.owner_id).await else {
            return Gated::redacted();
        };
        let ctx = self.context(viewer_id, &owner).await;
        match can_view(ctx, ResourceCategory::PostAndMedia, QueryShape::SingleItem) {
            Disposition::Allow => {
                if !ctx.is_owner() && post.status != PostStatus::Completed {
                    return Gated::redacted();
                }
                if !ctx.is_owner() {
                    self.store.posts.record_view(post_id, viewer_id).await;
                }
                Gated::visible(self.project_post(&post, ctx.is_owner()).await)
            }
            _ => Gated::redacted(),
        }
    }

    /// The viewed-by list on a post. Owner-only; everyone else gets a
    /// field-scoped error while the containing post still resolves.
    pub async fn viewed_by(&self, viewer_id: &str, post_id: &str) -> Gated<Page<UserSummary>> {
        let Some(post) = self.store.posts.get_post(post_id).await else {
            return Gated::redacted();
        };
        let Some(owner) = self.store.users.get(&post.owner_id).await else {
            return Gated::redacted();
        };
        let ctx = self.context(viewer_id, &owner).await;
        match can_view(ctx, ResourceCategory::ViewedBy, QueryShape::List) {
            Disposition::Allow => Gated::visible(Page {
                items: self.summaries(post.viewed_by.clone()).await,
            }),
            _ => Gated::denied(
                "getPost.viewedBy",
                QueryErrorType::VisibilityDenied,
                "User does not have access",
            ),
        }
    }

    /// Media objects of `target_id` (defaulting to the viewer's own),
    /// optionally filtered by status. Same gating as posts.
    pub async fn get_media_objects(
        &self,
        viewer_id: &str,
        target_id: Option<&str>,
        status: Option<MediaStatus>,
    ) -> Gated<Page<MediaProjection>> {
        let owner_id = target_id.unwrap_or(viewer_id);
        let Some(owner) = self.store.users.get(owner_id).await else {
            return Gated::denied(
                "getMediaObjects",
                QueryErrorType::NotFound,
                format!("user not found: {}", owner_id),
            );
        };
        let ctx = self.context(viewer_id, &owner).await;
        match can_view(ctx, ResourceCategory::PostAndMedia, QueryShape::List) {
            Disposition::Allow => {
                let mut media = self.store.posts.media_by_user(owner_id, status).await;
                if !ctx.is_owner() {
                    media.retain(|m| m.media_status == MediaStatus::Uploaded);
                }
                Gated::visible(Page {
                    items: media
                        .iter()
                        .map(|m| Self::project_media(m, ctx.is_owner()))
                        .collect(),
                })
            }
            // post/media denial is always loud on list queries
            Disposition::RedactNull | Disposition::DenyError => Gated::denied(
                "getMediaObjects",
                QueryErrorType::VisibilityDenied,
                "User does not have access",
            ),
        }
    }
}

#[derive(Clone, Copy)]
enum MembershipSide {
    Followers,
    Followed,
}

impl MembershipSide {
    fn path(self) -> &'static str {
        match self {
            MembershipSide::Followers => "user.followerUsers",
            MembershipSide::Followed => "user.followedUsers",
        }
    }
}
