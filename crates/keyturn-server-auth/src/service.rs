// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The token service shared by the issuance and refresh protocols.
//!
//! [`TokenService`] owns the codec, generator and hasher and holds `Arc`
//! handles to the store, notifier and clock. The protocols themselves live in
//! [`crate::issuance`] and [`crate::refresh`]; both finish by minting a new
//! pair through [`TokenService::mint`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::access_token::TokenCodec;
use crate::clock::{Clock, SystemClock};
use crate::error::{AuthError, HashError, StoreError};
use crate::notify::Notifier;
use crate::refresh_secret::RefreshSecretGenerator;
use crate::secret_hash::SecretHasher;
use crate::store::RotationStore;
use crate::types::{RefreshCredential, RequestContext, Subject, TokenPair};

/// Issues and rotates token pairs.
#[derive(Clone)]
pub struct TokenService {
	pub(crate) codec: TokenCodec,
	pub(crate) generator: RefreshSecretGenerator,
	pub(crate) hasher: SecretHasher,
	pub(crate) store: Arc<dyn RotationStore>,
	pub(crate) notifier: Arc<dyn Notifier>,
	pub(crate) clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TokenService")
			.field("codec", &self.codec)
			.field("hasher", &self.hasher)
			.finish_non_exhaustive()
	}
}

impl TokenService {
	/// Service reading the system clock.
	pub fn new(
		codec: TokenCodec,
		hasher: SecretHasher,
		store: Arc<dyn RotationStore>,
		notifier: Arc<dyn Notifier>,
	) -> Self {
		Self {
			codec,
			generator: RefreshSecretGenerator::new(),
			hasher,
			store,
			notifier,
			clock: Arc::new(SystemClock),
		}
	}

	/// Replace the clock, e.g. with a [`ManualClock`](crate::clock::ManualClock).
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	pub fn codec(&self) -> &TokenCodec {
		&self.codec
	}

	/// Mint an access token bound to `ctx.origin`, generate and hash a new
	/// refresh secret, and install it as the subject's only credential.
	///
	/// Nothing is returned unless the upsert succeeds.
	#[instrument(skip(self, ctx), fields(subject = %subject, origin = %ctx.origin))]
	pub(crate) async fn mint(
		&self,
		subject: &Subject,
		ctx: &RequestContext,
	) -> Result<TokenPair, AuthError> {
		let now = self.clock.now();
		let access_token = self.codec.issue(subject, &ctx.origin, now)?;

		let refresh_secret = self.generator.generate()?;
		let secret_hash = self.hasher.hash(&refresh_secret).map_err(|e| match e {
			HashError::Hashing(msg) | HashError::CorruptHash(msg) => AuthError::Hashing(msg),
		})?;

		let credential = RefreshCredential {
			subject: subject.clone(),
			secret_hash,
			origin: ctx.origin.clone(),
			updated_at: now,
		};

		let rows = within_store_deadline(ctx, self.store.upsert_by_subject(&credential)).await?;
		debug!(rows, "refresh credential installed");

		Ok(TokenPair {
			access_token,
			refresh_secret,
		})
	}
}

/// Run a store call under the request budget. A timeout is reported as
/// [`AuthError::StoreUnavailable`].
pub(crate) async fn within_store_deadline<T, F>(
	ctx: &RequestContext,
	call: F,
) -> Result<T, AuthError>
where
	F: Future<Output = Result<T, StoreError>>,
{
	match tokio::time::timeout(ctx.timeout, call).await {
		Ok(result) => result.map_err(AuthError::from),
		Err(_) => Err(AuthError::StoreUnavailable(format!(
			"store call exceeded {}ms",
			ctx.timeout.as_millis()
		))),
	}
}
