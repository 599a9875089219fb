// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Privacy policy engine. A single pure function maps (viewer, owner,
//! resource category, query shape, edge state, owner settings) to an
//! explicit disposition. All privacy behavior in the system funnels
//! through here; the gateway only materializes what this returns.

use crate::models::{EdgeState, PrivacyStatus};

/// What kind of field is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    /// A user's own profile projection.
    OwnProfile,
    /// Follower/followed counts and membership lists.
    ProfileCountsAndLists,
    /// Posts and media objects.
    PostAndMedia,
    /// The viewed-by list on a post.
    ViewedBy,
}

/// Whether the query addresses a collection or a single resource by id.
/// Denied list queries fail loudly; denied by-id lookups resolve to null
/// so that existence is not leaked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    List,
    SingleItem,
}

/// Outcome of a visibility decision. Never an exception: `RedactNull`
/// resolves the field to null with no error, `DenyError` attaches a
/// field-scoped error and nulls the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Allow,
    RedactNull,
    DenyError,
}

/// Inputs to a visibility decision, resolved by the gateway before the
/// call. Keeping them in one struct keeps call sites honest about what
/// the decision was based on.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub viewer_id: &'a str,
    pub owner_id: &'a str,
    pub edge_state: EdgeState,
    pub owner_privacy: PrivacyStatus,
    pub owner_hide_counts: bool,
}

impl<'a> ViewContext<'a> {
    pub fn is_owner(&self) -> bool {
        self.viewer_id == self.owner_id
    }
}

pub fn can_view(ctx: ViewContext<'_>, category: ResourceCategory, shape: QueryShape) -> Disposition {
    let decision = decide(ctx, category, shape);
    crate::metrics::record_visibility_decision(category, decision);
    decision
}

fn decide(ctx: ViewContext<'_>, category: ResourceCategory, shape: QueryShape) -> Disposition {
    match category {
        ResourceCategory::OwnProfile => {
            // Basic profile projection; per-field redaction (the hidden
            // flag, counts) is handled by the more specific categories.
            Disposition::Allow
        }
        ResourceCategory::ProfileCountsAndLists => {
            if ctx.is_owner() || !ctx.owner_hide_counts {
                Disposition::Allow
            } else {
                Disposition::RedactNull
            }
        }
        ResourceCategory::PostAndMedia => {
            let granted = ctx.is_owner()
                || ctx.owner_privacy == PrivacyStatus::Public
                || ctx.edge_state.is_following();
            if granted {
                Disposition::Allow
            } else {
                match shape {
                    QueryShape::List => Disposition::DenyError,
                    QueryShape::SingleItem => Disposition::RedactNull,
                }
            }
        }
        ResourceCategory::ViewedBy => {
            if ctx.is_owner() {
                Disposition::Allow
            } else {
                Disposition::DenyError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(
        viewer: &'static str,
        owner: &'static str,
        edge: EdgeState,
        privacy: PrivacyStatus,
        hide_counts: bool,
    ) -> ViewContext<'static> {
        ViewContext {
            viewer_id: viewer,
            owner_id: owner,
            edge_state: edge,
            owner_privacy: privacy,
            owner_hide_counts: hide_counts,
        }
    }

    #[test]
    fn public_owner_posts_visible_to_anyone() {
        for edge in [
            EdgeState::None,
            EdgeState::Requested,
            EdgeState::Denied,
            EdgeState::Following,
        ] {
            let c = ctx("viewer", "owner", edge, PrivacyStatus::Public, false);
            assert_eq!(
                can_view(c, ResourceCategory::PostAndMedia, QueryShape::List),
                Disposition::Allow
            );
            assert_eq!(
                can_view(c, ResourceCategory::PostAndMedia, QueryShape::SingleItem),
                Disposition::Allow
            );
        }
    }

    #[test]
    fn private_owner_posts_require_following() {
        for edge in [EdgeState::None, EdgeState::Requested, EdgeState::Denied] {
            let c = ctx("viewer", "owner", edge, PrivacyStatus::Private, false);
            assert_eq!(
                can_view(c, ResourceCategory::PostAndMedia, QueryShape::List),
                Disposition::DenyError
            );
            assert_eq!(
                can_view(c, ResourceCategory::PostAndMedia, QueryShape::SingleItem),
                Disposition::RedactNull
            );
        }
        let c = ctx(
            "viewer",
            "owner",
            EdgeState::Following,
            PrivacyStatus::Private,
            false,
        );
        assert_eq!(
            can_view(c, ResourceCategory::PostAndMedia, QueryShape::List),
            Disposition::Allow
        );
    }

    #[test]
    fn owner_always_sees_own_private_posts() {
        let c = ctx(
            "owner",
            "owner",
            EdgeState::None,
            PrivacyStatus::Private,
            true,
        );
        assert_eq!(
            can_view(c, ResourceCategory::PostAndMedia, QueryShape::List),
            Disposition::Allow
        );
    }

    #[test]
    fn hidden_counts_redact_for_others_but_not_owner() {
        let other = ctx("viewer", "owner", EdgeState::Following, PrivacyStatus::Public, true);
        assert_eq!(
            can_view(other, ResourceCategory::ProfileCountsAndLists, QueryShape::List),
            Disposition::RedactNull
        );
        let owner = ctx("owner", "owner", EdgeState::None, PrivacyStatus::Public, true);
        assert_eq!(
            can_view(owner, ResourceCategory::ProfileCountsAndLists, QueryShape::List),
            Disposition::Allow
        );
    }

    #[test]
    fn visible_counts_allowed_for_everyone() {
        let c = ctx("viewer", "owner", EdgeState::None, PrivacyStatus::Private, false);
        assert_eq!(
            can_view(c, ResourceCategory::ProfileCountsAndLists, QueryShape::List),
            Disposition::Allow
        );
    }

    #[test]
    fn viewed_by_is_owner_only_even_for_followers() {
        let follower = ctx(
            "viewer",
            "owner",
            EdgeState::Following,
            PrivacyStatus::Public,
            false,
        );
        assert_eq!(
            can_view(follower, ResourceCategory::ViewedBy, QueryShape::List),
            Disposition::DenyError
        );
        let owner = ctx("owner", "owner", EdgeState::None, PrivacyStatus::Public, false);
        assert_eq!(
            can_view(owner, ResourceCategory::ViewedBy, QueryShape::List),
            Disposition::Allow
        );
    }
}
