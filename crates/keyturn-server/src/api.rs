// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use axum::{
	routing::{get, post},
	Router,
};
use keyturn_server_auth::{
	HashCost, HashError, Notifier, RotationStore, SecretHasher, TokenCodec, TokenService,
	TracingNotifier,
};
use keyturn_server_config::ServerConfig;
use keyturn_server_db::RefreshCredentialRepository;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::routes;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
	pub service: Arc<TokenService>,
	pub pool: SqlitePool,
	/// Honour `X-Forwarded-For` / `X-Real-IP` when deriving the origin.
	pub trust_forwarded_headers: bool,
	/// Budget for each store and notifier call made on behalf of a request.
	pub request_timeout: Duration,
}

/// Build the application state from a migrated pool and resolved config.
///
/// Refresh credentials are stored in `pool` and origin changes are reported
/// through [`TracingNotifier`].
pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> Result<AppState, HashError> {
	let store: Arc<dyn RotationStore> = Arc::new(RefreshCredentialRepository::new(pool.clone()));
	let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
	create_app_state_with(pool, config, store, notifier)
}

/// Like [`create_app_state`] with explicit store and notifier.
pub fn create_app_state_with(
	pool: SqlitePool,
	config: &ServerConfig,
	store: Arc<dyn RotationStore>,
	notifier: Arc<dyn Notifier>,
) -> Result<AppState, HashError> {
	let auth = &config.auth;

	let codec = TokenCodec::new(auth.jwt_secret.clone());
	let hasher = SecretHasher::with_cost(HashCost {
		memory_kib: auth.hash_memory_kib,
		iterations: auth.hash_iterations,
		parallelism: auth.hash_parallelism,
	})?;

	if !codec.is_configured() {
		tracing::error!(
			"No JWT signing key configured; token requests will fail until KEYTURN_SERVER_JWT_SECRET is set"
		);
	}

	Ok(AppState {
		service: Arc::new(TokenService::new(codec, hasher, store, notifier)),
		pool,
		trust_forwarded_headers: config.http.trust_forwarded_headers,
		request_timeout: auth.request_timeout,
	})
}

/// Create the axum router with all routes.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/token", post(routes::tokens::issue_token))
		.route("/refresh", post(routes::tokens::refresh_token))
		.route("/health", get(routes::health::health_check))
		.with_state(state)
}
