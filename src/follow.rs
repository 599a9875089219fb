// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Follow state machine. All edge mutations flow through this service:
//! it validates the actor, decides the target state, and commits the edge
//! change together with its count side effect through the relationship
//! store's single write path. A rejected transition changes nothing.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::metrics;
use crate::models::{EdgeState, FollowStatus, PrivacyStatus};
use crate::store::Store;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The acting user is not a participant of the edge being mutated.
    #[error("actor is not a participant in this relationship")]
    Forbidden,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("user not found: {0}")]
    NotFound(String),
    /// The edge is not in a state this transition applies to.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

pub struct FollowService {
    store: Arc<Store>,
}

impl FollowService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    async fn require_user(&self, user_id: &str) -> Result<crate::models::UserRecord, TransitionError> {
        self.store
            .users
            .get(user_id)
            .await
            .ok_or_else(|| TransitionError::NotFound(user_id.to_string()))
    }

    /// `actor` requests to follow `target`. PUBLIC targets are followed
    /// immediately; PRIVATE targets get a pending request. A previously
    /// denied follower may re-request.
    pub async fn follow_user(
        &self,
        actor: &str,
        target: &str,
    ) -> Result<FollowStatus, TransitionError> {
        if actor == target {
            return Err(TransitionError::InvalidArgument(
                "cannot follow yourself".to_string(),
            ));
        }
        self.require_user(actor).await?;
        let target_user = self.require_user(target).await?;

        let granted = match target_user.privacy_status {
            PrivacyStatus::Public => FollowStatus::Following,
            PrivacyStatus::Private => FollowStatus::Requested,
        };
        let (from, to) = self
            .store
            .graph
            .transition(actor, target, |current| match current {
                EdgeState::None | EdgeState::Denied => Ok(EdgeState::from(granted)),
                EdgeState::Requested => Err(TransitionError::InvalidTransition(
                    "follow request already pending".to_string(),
                )),
                EdgeState::Following => Err(TransitionError::InvalidTransition(
                    "already following".to_string(),
                )),
            })
            .await?;
        metrics::record_follow_transition(from, to);
        info!(actor = actor, target = target, ?to, "follow request committed");
        Ok(granted)
    }

    /// Remove the (follower, followed) edge from any state. Only the
    /// follower side may unfollow.
    pub async fn unfollow_user(
        &self,
        actor: &str,
        follower: &str,
        followed: &str,
    ) -> Result<EdgeState, TransitionError> {
        if actor != follower {
            return Err(TransitionError::Forbidden);
        }
        self.require_user(followed).await?;
        let (from, to) = self
            .store
            .graph
            .transition(follower, followed, |current| match current {
                EdgeState::None => Err(TransitionError::InvalidTransition(
                    "no follow relationship exists".to_string(),
                )),
                _ => Ok(EdgeState::None),
            })
            .await?;
        metrics::record_follow_transition(from, to);
        info!(actor = actor, followed = followed, "unfollowed");
        Ok(to)
    }

    /// The followed user accepts a pending request from `follower`.
    pub async fn accept_follower(
        &self,
        actor: &str,
        follower: &str,
        followed: &str,
    ) -> Result<FollowStatus, TransitionError> {
        self.decide_request(actor, follower, followed, FollowStatus::Following)
            .await
    }

    /// The followed user denies a pending request from `follower`.
    pub async fn deny_follower(
        &self,
        actor: &str,
        follower: &str,
        followed: &str,
    ) -> Result<FollowStatus, TransitionError> {
        self.decide_request(actor, follower, followed, FollowStatus::Denied)
            .await
    }

    async fn decide_request(
        &self,
        actor: &str,
        follower: &str,
        followed: &str,
        decision: FollowStatus,
    ) -> Result<FollowStatus, TransitionError> {
        if actor != followed {
            return Err(TransitionError::Forbidden);
        }
        self.require_user(follower).await?;
        let (from, to) = self
            .store
            .graph
            .transition(follower, followed, |current| match current {
                EdgeState::Requested => Ok(decision.into()),
                EdgeState::None => Err(TransitionError::InvalidTransition(
                    "no follow request from this user".to_string(),
                )),
                other => Err(TransitionError::InvalidTransition(format!(
                    "follow request already resolved to {:?}",
                    other
                ))),
            })
            .await?;
        metrics::record_follow_transition(from, to);
        info!(
            follower = follower,
            followed = followed,
            ?to,
            "follow request decided"
        );
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (Arc<Store>, FollowService) {
        let store = Arc::new(Store::new());
        store.users.create("alice", "alice").await.unwrap();
        store.users.create("bob", "bob").await.unwrap();
        let service = FollowService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn following_a_public_user_is_immediate() {
        let (store, service) = setup().await;
        let status = service.follow_user("alice", "bob").await.unwrap();
        assert_eq!(status, FollowStatus::Following);
        assert_eq!(store.graph.counts("bob").await.follower_count, 1);
        assert_eq!(store.graph.counts("alice").await.followed_count, 1);
    }

    #[tokio::test]
    async fn following_a_private_user_creates_a_request() {
        let (store, service) = setup().await;
        store
            .users
            .set_privacy_status("bob", PrivacyStatus::Private)
            .await
            .unwrap();
        let status = service.follow_user("alice", "bob").await.unwrap();
        assert_eq!(status, FollowStatus::Requested);
        // requests do not touch counts
        assert_eq!(store.graph.counts("bob").await.follower_count, 0);
    }

    #[tokio::test]
    async fn self_follow_is_invalid() {
        let (_store, service) = setup().await;
        let err = service.follow_user("alice", "alice").await.unwrap_err();
        assert!(matches!(err, TransitionError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn follow_of_unknown_user_is_not_found() {
        let (_store, service) = setup().await;
        let err = service.follow_user("alice", "nobody").await.unwrap_err();
        assert_eq!(err, TransitionError::NotFound("nobody".to_string()));
    }

    #[tokio::test]
    async fn duplicate_follow_is_rejected_without_count_change() {
        let (store, service) = setup().await;
        service.follow_user("alice", "bob").await.unwrap();
        let err = service.follow_user("alice", "bob").await.unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition(_)));
        assert_eq!(store.graph.counts("bob").await.follower_count, 1);
    }

    #[tokio::test]
    async fn accept_moves_requested_to_following_with_counts() {
        let (store, service) = setup().await;
        store
            .users
            .set_privacy_status("bob", PrivacyStatus::Private)
            .await
            .unwrap();
        service.follow_user("alice", "bob").await.unwrap();
        let status = service
            .accept_follower("bob", "alice", "bob")
            .await
            .unwrap();
        assert_eq!(status, FollowStatus::Following);
        assert_eq!(store.graph.counts("bob").await.follower_count, 1);
        assert_eq!(store.graph.counts("alice").await.followed_count, 1);
    }

    #[tokio::test]
    async fn deny_then_rerequest_then_accept() {
        let (store, service) = setup().await;
        store
            .users
            .set_privacy_status("bob", PrivacyStatus::Private)
            .await
            .unwrap();
        service.follow_user("alice", "bob").await.unwrap();
        let status = service.deny_follower("bob", "alice", "bob").await.unwrap();
        assert_eq!(status, FollowStatus::Denied);
        assert_eq!(store.graph.counts("bob").await.follower_count, 0);

        // a denied follower may ask again
        let status = service.follow_user("alice", "bob").await.unwrap();
        assert_eq!(status, FollowStatus::Requested);
        let status = service
            .accept_follower("bob", "alice", "bob")
            .await
            .unwrap();
        assert_eq!(status, FollowStatus::Following);
    }

    #[tokio::test]
    async fn denied_follower_of_now_public_user_follows_directly() {
        let (store, service) = setup().await;
        store
            .users
            .set_privacy_status("bob", PrivacyStatus::Private)
            .await
            .unwrap();
        service.follow_user("alice", "bob").await.unwrap();
        service.deny_follower("bob", "alice", "bob").await.unwrap();
        store
            .users
            .set_privacy_status("bob", PrivacyStatus::Public)
            .await
            .unwrap();
        let status = service.follow_user("alice", "bob").await.unwrap();
        assert_eq!(status, FollowStatus::Following);
    }

    #[tokio::test]
    async fn accept_by_non_participant_is_forbidden() {
        let (store, service) = setup().await;
        store.users.create("carol", "carol").await.unwrap();
        store
            .users
            .set_privacy_status("bob", PrivacyStatus::Private)
            .await
            .unwrap();
        service.follow_user("alice", "bob").await.unwrap();
        let err = service
            .accept_follower("carol", "alice", "bob")
            .await
            .unwrap_err();
        assert_eq!(err, TransitionError::Forbidden);
        assert_eq!(
            store.graph.edge_state("alice", "bob").await,
            EdgeState::Requested
        );
    }

    #[tokio::test]
    async fn accept_without_request_is_invalid() {
        let (_store, service) = setup().await;
        let err = service
            .accept_follower("bob", "alice", "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn unfollow_clears_any_state_and_counts() {
        let (store, service) = setup().await;
        service.follow_user("alice", "bob").await.unwrap();
        let state = service.unfollow_user("alice", "alice", "bob").await.unwrap();
        assert_eq!(state, EdgeState::None);
        assert_eq!(store.graph.counts("bob").await.follower_count, 0);
        assert_eq!(store.graph.counts("alice").await.followed_count, 0);

        let err = service
            .unfollow_user("alice", "alice", "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn unfollow_by_non_follower_is_forbidden() {
        let (_store, service) = setup().await;
        let err = service
            .unfollow_user("bob", "alice", "bob")
            .await
            .unwrap_err();
        assert_eq!(err, TransitionError::Forbidden);
    }
}
