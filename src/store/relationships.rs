// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{EdgeState, FollowCounts, FollowEdge, FollowStatus};

/// Edge map plus the count projection, behind one lock so that no reader
/// can observe a committed edge without its count delta or vice versa.
#[derive(Default)]
struct GraphState {
    edges: HashMap<(String, String), FollowEdge>,
    counts: HashMap<String, FollowCounts>,
}

/// Authoritative store for directed follow edges. No edge exists between
/// any two users until a follow request creates one; removal restores the
/// distinct NOT_FOLLOWING state.
#[derive(Default)]
pub struct RelationshipStore {
    state: RwLock<GraphState>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn edge_state(&self, follower: &str, followed: &str) -> EdgeState {
        let state = self.state.read().await;
        state
            .edges
            .get(&(follower.to_string(), followed.to_string()))
            .map(|e| Some(e.status))
            .unwrap_or(None)
            .into()
    }

    pub async fn edge(&self, follower: &str, followed: &str) -> Option<FollowEdge> {
        let state = self.state.read().await;
        state
            .edges
            .get(&(follower.to_string(), followed.to_string()))
            .cloned()
    }

    /// Apply a state transition to the (follower, followed) edge. The
    /// `decide` closure receives the current state and returns the target
    /// state or a domain error. The edge write and the count adjustment
    /// commit under the same write guard; on error nothing is applied.
    pub async fn transition<F, E>(
        &self,
        follower: &str,
        followed: &str,
        decide: F,
    ) -> Result<(EdgeState, EdgeState), E>
    where
        F: FnOnce(EdgeState) -> Result<EdgeState, E>,
    {
        let mut state = self.state.write().await;
        let key = (follower.to_string(), followed.to_string());
        let current: EdgeState = state.edges.get(&key).map(|e| Some(e.status)).unwrap_or(None).into();
        let next = decide(current)?;

        let now = Utc::now();
        match next.status() {
            None => {
                state.edges.remove(&key);
            }
            Some(status) => {
                state
                    .edges
                    .entry(key)
                    .and_modify(|edge| {
                        edge.status = status;
                        edge.updated_at = now;
                    })
                    .or_insert_with(|| FollowEdge {
                        follower_id: follower.to_string(),
                        followed_id: followed.to_string(),
                        status,
                        created_at: now,
                        updated_at: now,
                    });
            }
        }

        // Only FOLLOWING affects the count projection.
        let delta = i64::from(next.is_following()) - i64::from(current.is_following());
        if delta != 0 {
            let followed_counts = state.counts.entry(followed.to_string()).or_default();
            followed_counts.follower_count += delta;
            let follower_counts = state.counts.entry(follower.to_string()).or_default();
            follower_counts.followed_count += delta;
        }

        debug!(
            follower = follower,
            followed = followed,
            ?current,
            ?next,
            "committed follow transition"
        );
        Ok((current, next))
    }

    /// Users with an edge toward `user_id`, newest first, optionally
    /// restricted to a single status.
    pub async fn list_followers(
        &self,
        user_id: &str,
        filter: Option<FollowStatus>,
    ) -> Vec<String> {
        let state = self.state.read().await;
        let mut edges: Vec<&FollowEdge> = state
            .edges
            .values()
            .filter(|e| e.followed_id == user_id)
            .filter(|e| filter.map_or(true, |f| e.status == f))
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        edges.into_iter().map(|e| e.follower_id.clone()).collect()
    }

    /// Users that `user_id` has an edge toward, newest first.
    pub async fn list_followed(
        &self,
        user_id: &str,
        filter: Option<FollowStatus>,
    ) -> Vec<String> {
        let state = self.state.read().await;
        let mut edges: Vec<&FollowEdge> = state
            .edges
            .values()
            .filter(|e| e.follower_id == user_id)
            .filter(|e| filter.map_or(true, |f| e.status == f))
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        edges.into_iter().map(|e| e.followed_id.clone()).collect()
    }

    pub async fn counts(&self, user_id: &str) -> FollowCounts {
        let state = self.state.read().await;
        state.counts.get(user_id).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_edge_exists_by_default() {
        let store = RelationshipStore::new();
        assert_eq!(store.edge_state("a", "b").await, EdgeState::None);
        assert_eq!(store.edge_state("b", "a").await, EdgeState::None);
    }

    #[tokio::test]
    async fn transition_commits_edge_and_counts_together() {
        let store = RelationshipStore::new();
        let (from, to) = store
            .transition("a", "b", |cur| Ok::<_, ()>(match cur {
                EdgeState::None => EdgeState::Following,
                other => other,
            }))
            .await
            .unwrap();
        assert_eq!(from, EdgeState::None);
        assert_eq!(to, EdgeState::Following);
        assert_eq!(store.counts("b").await.follower_count, 1);
        assert_eq!(store.counts("a").await.followed_count, 1);
        assert_eq!(store.counts("a").await.follower_count, 0);
    }

    #[tokio::test]
    async fn failed_transition_applies_nothing() {
        let store = RelationshipStore::new();
        let result = store
            .transition("a", "b", |_| Err::<EdgeState, &str>("rejected"))
            .await;
        assert!(result.is_err());
        assert_eq!(store.edge_state("a", "b").await, EdgeState::None);
        assert_eq!(store.counts("b").await.follower_count, 0);
    }

    #[tokio::test]
    async fn requested_edges_do_not_affect_counts() {
        let store = RelationshipStore::new();
        store
            .transition("a", "b", |_| Ok::<_, ()>(EdgeState::Requested))
            .await
            .unwrap();
        assert_eq!(store.counts("b").await.follower_count, 0);
        assert_eq!(
            store.list_followers("b", Some(FollowStatus::Requested)).await,
            vec!["a".to_string()]
        );
        assert!(store
            .list_followers("b", Some(FollowStatus::Following))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn removing_a_following_edge_decrements_counts() {
        let store = RelationshipStore::new();
        store
            .transition("a", "b", |_| Ok::<_, ()>(EdgeState::Following))
            .await
            .unwrap();
        store
            .transition("a", "b", |_| Ok::<_, ()>(EdgeState::None))
            .await
            .unwrap();
        assert_eq!(store.edge_state("a", "b").await, EdgeState::None);
        assert_eq!(store.counts("b").await.follower_count, 0);
        assert_eq!(store.counts("a").await.followed_count, 0);
    }

    #[tokio::test]
    async fn follower_and_followed_lists_are_directional() {
        let store = RelationshipStore::new();
        store
            .transition("a", "b", |_| Ok::<_, ()>(EdgeState::Following))
            .await
            .unwrap();
        assert_eq!(store.list_followers("b", None).await, vec!["a".to_string()]);
        assert_eq!(store.list_followed("a", None).await, vec!["b".to_string()]);
        assert!(store.list_followers("a", None).await.is_empty());
        assert!(store.list_followed("b", None).await.is_empty());
    }
}
