// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::response::IntoResponse;

/// Prometheus metrics endpoint
pub async fn get_metrics() -> impl IntoResponse {
    crate::metrics::gather()
}
