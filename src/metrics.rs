// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::error;

use crate::models::EdgeState;
use crate::policy::{Disposition, ResourceCategory};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static FOLLOW_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "follow_transitions_total",
            "Committed follow edge transitions by from/to state",
        ),
        &["from", "to"],
    )
    .expect("valid metric definition");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registration");
    counter
});

static VISIBILITY_DECISIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "visibility_decisions_total",
            "Policy engine decisions by resource category and disposition",
        ),
        &["category", "disposition"],
    )
    .expect("valid metric definition");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registration");
    counter
});

fn edge_label(state: EdgeState) -> &'static str {
    match state {
        EdgeState::None => "none",
        EdgeState::Requested => "requested",
        EdgeState::Following => "following",
        EdgeState::Denied => "denied",
    }
}

fn category_label(category: ResourceCategory) -> &'static str {
    match category {
        ResourceCategory::OwnProfile => "own_profile",
        ResourceCategory::ProfileCountsAndLists => "profile_counts_and_lists",
        ResourceCategory::PostAndMedia => "post_and_media",
        ResourceCategory::ViewedBy => "viewed_by",
    }
}

fn disposition_label(disposition: Disposition) -> &'static str {
    match disposition {
        Disposition::Allow => "allow",
        Disposition::RedactNull => "redact_null",
        Disposition::DenyError => "deny_error",
    }
}

pub fn record_follow_transition(from: EdgeState, to: EdgeState) {
    FOLLOW_TRANSITIONS
        .with_label_values(&[edge_label(from), edge_label(to)])
        .inc();
}

pub fn record_visibility_decision(category: ResourceCategory, disposition: Disposition) {
    VISIBILITY_DECISIONS
        .with_label_values(&[category_label(category), disposition_label(disposition)])
        .inc();
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
