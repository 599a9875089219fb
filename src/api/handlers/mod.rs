// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod health;
pub mod metrics;
pub mod users;
pub mod follows;
pub mod posts;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::gateway::Gated;

/// Authenticated viewer identity, issued by the external identity
/// provider and carried on every request as the `x-user-id` header.
pub struct Viewer(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| Viewer(v.to_string()))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "missing x-user-id header"})),
            ))
    }
}

/// Materialize a gated result as a `{data, errors}` envelope. A denial
/// nulls the whole data payload; a redaction resolves the field to null
/// with no error entry.
pub fn envelope<T: Serialize>(field: &'static str, gated: Gated<T>) -> Json<Value> {
    if gated.is_denied() {
        return Json(json!({ "data": null, "errors": gated.errors }));
    }
    let mut data = serde_json::Map::new();
    data.insert(
        field.to_string(),
        serde_json::to_value(&gated.data).unwrap_or(Value::Null),
    );
    Json(json!({ "data": data }))
}
