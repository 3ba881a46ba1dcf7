// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token issuance and refresh handlers.

use axum::{
	extract::{rejection::JsonRejection, State},
	Json,
};
use keyturn_common_secret::SecretString;
use keyturn_server_auth::{RefreshRequest, RequestContext, Subject, TokenPair};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::client_info::ClientOrigin;
use crate::error::ServerError;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
	pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
	pub access_token: String,
	pub refresh_token: SecretString,
}

/// Body of every successful issuance or refresh. The refresh token is shown
/// exactly once.
#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
	pub access_token: String,
	pub refresh_token: String,
}

impl From<TokenPair> for TokenResponse {
	fn from(pair: TokenPair) -> Self {
		Self {
			access_token: pair.access_token,
			refresh_token: pair.refresh_secret.expose().clone(),
		}
	}
}

/// POST /token - issue a pair for `user_id`, bound to the caller's origin.
#[tracing::instrument(skip_all, fields(origin = %origin))]
pub async fn issue_token(
	State(state): State<AppState>,
	ClientOrigin(origin): ClientOrigin,
	payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ServerError> {
	let Json(request) = payload?;
	let subject = Subject::parse(request.user_id)?;
	let ctx = RequestContext::new(origin).with_timeout(state.request_timeout);

	let pair = state.service.issue(&subject, &ctx).await?;
	tracing::info!(subject = %subject, "token pair issued");
	Ok(Json(pair.into()))
}

/// POST /refresh - exchange a pair for a new one.
#[tracing::instrument(skip_all, fields(origin = %origin))]
pub async fn refresh_token(
	State(state): State<AppState>,
	ClientOrigin(origin): ClientOrigin,
	payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ServerError> {
	let Json(request) = payload?;
	let ctx = RequestContext::new(origin).with_timeout(state.request_timeout);
	let request = RefreshRequest {
		access_token: request.access_token,
		refresh_secret: request.refresh_token,
	};

	let pair = state.service.refresh(&request, &ctx).await?;
	tracing::info!("token pair rotated");
	Ok(Json(pair.into()))
}
