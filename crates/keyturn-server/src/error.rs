// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.
//!
//! Response bodies are deliberately coarse. Every rejected refresh reads the
//! same `unauthorized` body; the precise reason only reaches the logs.

use axum::{
	extract::rejection::JsonRejection,
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use keyturn_server_auth::AuthError;
use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

/// Server error types.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Token issuance or refresh failed.
	#[error(transparent)]
	Auth(#[from] AuthError),

	/// The request body could not be decoded.
	#[error("Invalid request: {0}")]
	BadRequest(String),
}

impl From<JsonRejection> for ServerError {
	fn from(rejection: JsonRejection) -> Self {
		ServerError::BadRequest(rejection.body_text())
	}
}

impl ServerError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			ServerError::Auth(err) => {
				StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
			}
			ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
		}
	}

	fn log(&self) {
		match self {
			ServerError::Auth(err) if err.is_internal() => {
				tracing::error!(error = %err, "token request failed");
			}
			ServerError::Auth(err) if err.is_rejection() => {
				tracing::warn!(reason = %err, "token request rejected");
			}
			ServerError::Auth(err) => {
				tracing::info!(reason = %err, "malformed token request");
			}
			ServerError::BadRequest(msg) => {
				tracing::info!(reason = %msg, "undecodable request body");
			}
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		self.log();

		let status = self.status_code();
		let (error, message) = match status {
			StatusCode::BAD_REQUEST => ("invalid_request", "The request could not be understood"),
			StatusCode::UNAUTHORIZED => ("unauthorized", "Invalid credentials"),
			_ => ("internal_error", "Internal server error"),
		};

		let body = ErrorResponse {
			error: error.to_string(),
			message: message.to_string(),
		};

		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use keyturn_server_auth::{StoreError, TokenError};

	async fn body_of(err: ServerError) -> (StatusCode, ErrorResponse) {
		let response = err.into_response();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		(status, serde_json::from_slice(&bytes).unwrap())
	}

	#[tokio::test]
	async fn rejections_share_one_body() {
		let mut bodies = Vec::new();
		for err in [
			AuthError::InvalidAccessToken(TokenError::Expired),
			AuthError::InvalidAccessToken(TokenError::InvalidSignature),
			AuthError::NoRefreshCredential,
			AuthError::InvalidRefreshSecret,
		] {
			let (status, body) = body_of(ServerError::Auth(err)).await;
			assert_eq!(status, StatusCode::UNAUTHORIZED);
			bodies.push((body.error, body.message));
		}
		bodies.dedup();
		assert_eq!(bodies.len(), 1);
		assert_eq!(bodies[0].0, "unauthorized");
	}

	#[tokio::test]
	async fn malformed_and_bad_body_are_400() {
		let (status, body) =
			body_of(ServerError::Auth(AuthError::Malformed("empty subject".into()))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body.error, "invalid_request");

		let (status, _) = body_of(ServerError::BadRequest("missing field".into())).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn internal_faults_do_not_leak_details() {
		let err: AuthError = StoreError::Unavailable("database is locked".into()).into();
		let (status, body) = body_of(ServerError::Auth(err)).await;
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body.error, "internal_error");
		assert!(!body.message.contains("locked"));
	}
}
