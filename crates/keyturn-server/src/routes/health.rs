// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
}

/// GET /health - 200 when the database answers, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let probe = tokio::time::timeout(state.request_timeout, keyturn_server_db::ping(&state.pool)).await;

	match probe {
		Ok(Ok(())) => (
			StatusCode::OK,
			Json(HealthResponse {
				status: "healthy".to_string(),
			}),
		),
		Ok(Err(e)) => {
			tracing::error!(error = %e, "health check: database unreachable");
			unhealthy()
		}
		Err(_) => {
			tracing::error!("health check: database probe timed out");
			unhealthy()
		}
	}
}

fn unhealthy() -> (StatusCode, Json<HealthResponse>) {
	(
		StatusCode::SERVICE_UNAVAILABLE,
		Json(HealthResponse {
			status: "unhealthy".to_string(),
		}),
	)
}
