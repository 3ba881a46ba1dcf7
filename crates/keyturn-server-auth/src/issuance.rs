// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! First-time issuance of a token pair.

use tracing::{info, instrument};

use crate::error::AuthError;
use crate::service::TokenService;
use crate::types::{RequestContext, Subject, TokenPair};

impl TokenService {
	/// Issue a fresh pair for `subject`, replacing any refresh credential the
	/// subject already had.
	///
	/// Fails as a whole if any step fails; in particular no pair is returned
	/// when the store rejects or times out on the upsert.
	#[instrument(name = "token.issue", skip(self, ctx), fields(subject = %subject, origin = %ctx.origin))]
	pub async fn issue(
		&self,
		subject: &Subject,
		ctx: &RequestContext,
	) -> Result<TokenPair, AuthError> {
		let pair = self.mint(subject, ctx).await?;
		info!("issued token pair");
		Ok(pair)
	}
}
