// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signed, short-lived access tokens.
//!
//! Access tokens are compact JWS strings signed with HMAC-SHA-512 (`HS512`)
//! under the process-wide signing key. They bind a subject to the origin the
//! token was issued to and expire [`ACCESS_TOKEN_TTL_MINUTES`] after issuance.
//! Nothing about them is stored server-side.
//!
//! Verification only accepts `HS512`. A header naming any other algorithm
//! (`none`, `HS256`, `RS256`, ...) is rejected as an invalid signature before
//! the signature is even looked at.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use keyturn_common_secret::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::TokenError;
use crate::types::{Origin, Subject};

/// Access token lifetime in minutes.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

/// The only accepted signing algorithm.
pub const ACCESS_TOKEN_ALGORITHM: Algorithm = Algorithm::HS512;

/// Verified contents of an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
	pub subject: Subject,
	pub origin: Origin,
	pub issued_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

/// JWT payload as it appears on the wire.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
	sub: String,
	origin: String,
	iat: i64,
	exp: i64,
}

/// Issues and verifies access tokens under one signing key.
///
/// Construction never fails; an empty key is reported by every
/// [`issue`](Self::issue) and [`verify`](Self::verify) call instead.
#[derive(Clone)]
pub struct TokenCodec {
	signing_key: SecretString,
}

impl std::fmt::Debug for TokenCodec {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenCodec")
			.field("signing_key", &self.signing_key)
			.field("configured", &!self.signing_key.is_empty())
			.finish()
	}
}

impl TokenCodec {
	pub fn new(signing_key: SecretString) -> Self {
		Self { signing_key }
	}

	/// True when a non-empty signing key was supplied.
	pub fn is_configured(&self) -> bool {
		!self.signing_key.is_empty()
	}

	fn key_bytes(&self) -> Result<&[u8], TokenError> {
		if self.signing_key.is_empty() {
			return Err(TokenError::MissingSigningKey);
		}
		Ok(self.signing_key.expose().as_bytes())
	}

	/// Sign a new access token for `subject`, bound to `origin`.
	#[instrument(skip(self), fields(subject = %subject, origin = %origin))]
	pub fn issue(
		&self,
		subject: &Subject,
		origin: &Origin,
		now: DateTime<Utc>,
	) -> Result<String, TokenError> {
		let key = self.key_bytes()?;
		// Claims carry whole seconds; the lifetime starts at the truncated instant.
		let now = now.trunc_subsecs(0);
		let expires_at = now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES);

		let claims = WireClaims {
			sub: subject.as_str().to_string(),
			origin: origin.as_str().to_string(),
			iat: now.timestamp(),
			exp: expires_at.timestamp(),
		};

		let token = encode(
			&Header::new(ACCESS_TOKEN_ALGORITHM),
			&claims,
			&EncodingKey::from_secret(key),
		)
		.map_err(|e| TokenError::Encoding(e.to_string()))?;

		debug!(exp = claims.exp, "issued access token");
		Ok(token)
	}

	/// Check signature, algorithm and expiry, returning the claims.
	///
	/// A token is still valid at exactly its `exp` instant.
	#[instrument(skip(self, token))]
	pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError> {
		let key = self.key_bytes()?;

		ensure_expected_algorithm(token)?;

		let mut validation = Validation::new(ACCESS_TOKEN_ALGORITHM);
		// Expiry is checked against the injected clock below.
		validation.validate_exp = false;
		validation.set_required_spec_claims(&["exp", "iat", "sub"]);

		let data = decode::<WireClaims>(token, &DecodingKey::from_secret(key), &validation)
			.map_err(|e| match e.kind() {
				ErrorKind::InvalidSignature
				| ErrorKind::InvalidAlgorithm
				| ErrorKind::InvalidAlgorithmName
				| ErrorKind::MissingAlgorithm => TokenError::InvalidSignature,
				_ => TokenError::Malformed(e.to_string()),
			})?;

		let claims = into_access_claims(data.claims)?;
		if now > claims.expires_at {
			debug!(expires_at = %claims.expires_at, "access token expired");
			return Err(TokenError::Expired);
		}

		Ok(claims)
	}
}

/// Reject anything whose header does not name `HS512`.
///
/// Runs before signature verification so that `none` and asymmetric
/// algorithms are reported as signature failures rather than parse errors.
fn ensure_expected_algorithm(token: &str) -> Result<(), TokenError> {
	let mut segments = token.split('.');
	let (Some(header), Some(_), Some(_), None) = (
		segments.next(),
		segments.next(),
		segments.next(),
		segments.next(),
	) else {
		return Err(TokenError::Malformed(
			"expected three dot-separated segments".to_string(),
		));
	};

	let raw = URL_SAFE_NO_PAD
		.decode(header)
		.map_err(|e| TokenError::Malformed(format!("header is not base64url: {e}")))?;
	let header: serde_json::Value = serde_json::from_slice(&raw)
		.map_err(|e| TokenError::Malformed(format!("header is not JSON: {e}")))?;

	match header.get("alg").and_then(|alg| alg.as_str()) {
		Some("HS512") => Ok(()),
		Some(other) => {
			debug!(alg = other, "rejecting access token with unexpected algorithm");
			Err(TokenError::InvalidSignature)
		}
		None => Err(TokenError::Malformed("header has no alg".to_string())),
	}
}

fn into_access_claims(wire: WireClaims) -> Result<AccessClaims, TokenError> {
	let subject = Subject::parse(wire.sub)
		.map_err(|_| TokenError::Malformed("empty sub claim".to_string()))?;
	let issued_at = DateTime::from_timestamp(wire.iat, 0)
		.ok_or_else(|| TokenError::Malformed("iat out of range".to_string()))?;
	let expires_at = DateTime::from_timestamp(wire.exp, 0)
		.ok_or_else(|| TokenError::Malformed("exp out of range".to_string()))?;

	Ok(AccessClaims {
		subject,
		origin: Origin::new(wire.origin),
		issued_at,
		expires_at,
	})
}
