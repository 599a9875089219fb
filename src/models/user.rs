// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account privacy setting. PUBLIC resources are visible to everyone;
/// PRIVATE resources require a FOLLOWING edge from the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivacyStatus {
    Public,
    Private,
}

impl Default for PrivacyStatus {
    fn default() -> Self {
        PrivacyStatus::Public
    }
}

/// Stored user record. Privacy fields are mutable only through the
/// self-mutation endpoints; everything a viewer sees goes through the
/// gateway projection, never through this struct directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    pub privacy_status: PrivacyStatus,
    pub follow_counts_hidden: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            privacy_status: PrivacyStatus::default(),
            follow_counts_hidden: false,
            created_at: Utc::now(),
        }
    }
}
