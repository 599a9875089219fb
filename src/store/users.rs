// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use tokio::sync::RwLock;

use super::StoreError;
use crate::models::{PrivacyStatus, UserRecord};

/// User records keyed by user id.
#[derive(Default)]
pub struct UserStore {
    inner: RwLock<HashMap<String, UserRecord>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, user_id: &str, username: &str) -> Result<UserRecord, StoreError> {
        let mut users = self.inner.write().await;
        if users.contains_key(user_id) {
            return Err(StoreError::DuplicateUser(user_id.to_string()));
        }
        let record = UserRecord::new(user_id, username);
        users.insert(user_id.to_string(), record.clone());
        Ok(record)
    }

    pub async fn get(&self, user_id: &str) -> Option<UserRecord> {
        self.inner.read().await.get(user_id).cloned()
    }

    pub async fn require(&self, user_id: &str) -> Result<UserRecord, StoreError> {
        self.get(user_id)
            .await
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))
    }

    pub async fn set_privacy_status(
        &self,
        user_id: &str,
        status: PrivacyStatus,
    ) -> Result<UserRecord, StoreError> {
        let mut users = self.inner.write().await;
        let record = users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        record.privacy_status = status;
        Ok(record.clone())
    }

    pub async fn set_follow_counts_hidden(
        &self,
        user_id: &str,
        hidden: bool,
    ) -> Result<UserRecord, StoreError> {
        let mut users = self.inner.write().await;
        let record = users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        record.follow_counts_hidden = hidden;
        Ok(record.clone())
    }
}
