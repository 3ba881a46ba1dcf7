// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for token issuance and refresh.
//!
//! Component errors ([`TokenError`], [`HashError`], [`StoreError`],
//! [`NotifyError`]) are folded into [`AuthError`] by the protocols. The
//! transport only looks at [`AuthError::status_code`], which collapses every
//! rejection into one 401 so a client cannot tell which check failed.

use thiserror::Error;

/// Access token codec failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
	/// Not a structurally valid token.
	#[error("malformed access token: {0}")]
	Malformed(String),

	/// Signature mismatch or an algorithm other than HS512.
	#[error("invalid access token signature")]
	InvalidSignature,

	/// Past its `exp` claim.
	#[error("access token expired")]
	Expired,

	/// The codec was built without a signing key.
	#[error("signing key is not configured")]
	MissingSigningKey,

	/// Claims could not be serialized or signed.
	#[error("failed to encode access token: {0}")]
	Encoding(String),
}

/// Refresh secret hash verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
	/// The stored value is not a parseable PHC hash string.
	#[error("stored secret hash is corrupt: {0}")]
	CorruptHash(String),

	/// Hashing a new secret failed.
	#[error("failed to hash secret: {0}")]
	Hashing(String),
}

/// Rotation store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
	/// The backing store could not be reached or rejected the statement.
	#[error("store unavailable: {0}")]
	Unavailable(String),

	/// The store violated the one-row-per-subject invariant.
	#[error("store integrity violation: {0}")]
	Integrity(String),
}

/// Notification channel failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Outcome of a failed issuance or refresh.
#[derive(Debug, Error)]
pub enum AuthError {
	// =========================================================================
	// Request shape
	// =========================================================================
	/// The request could not be interpreted (e.g. empty subject).
	#[error("malformed request: {0}")]
	Malformed(String),

	// =========================================================================
	// Rejections
	// =========================================================================
	/// The presented access token failed verification.
	#[error("invalid access token: {0}")]
	InvalidAccessToken(#[source] TokenError),

	/// No refresh credential exists for the token's subject.
	#[error("no refresh credential for subject")]
	NoRefreshCredential,

	/// The presented refresh secret does not match the stored hash.
	#[error("invalid refresh secret")]
	InvalidRefreshSecret,

	// =========================================================================
	// Internal faults
	// =========================================================================
	/// The origin-change notification could not be delivered.
	#[error("notification failed: {0}")]
	NotificationFailed(String),

	/// The rotation store failed or timed out.
	#[error("store unavailable: {0}")]
	StoreUnavailable(String),

	/// The rotation store returned data that breaks its contract.
	#[error("store integrity violation: {0}")]
	StoreIntegrity(String),

	/// The operating system random source failed.
	#[error("entropy unavailable: {0}")]
	EntropyUnavailable(String),

	/// Hashing a new refresh secret failed.
	#[error("hashing error: {0}")]
	Hashing(String),

	/// Missing or unusable configuration (e.g. no signing key).
	#[error("configuration fault: {0}")]
	ConfigurationFault(String),
}

impl AuthError {
	/// True for faults the client cannot fix; log these at error level.
	pub fn is_internal(&self) -> bool {
		matches!(
			self,
			AuthError::NotificationFailed(_)
				| AuthError::StoreUnavailable(_)
				| AuthError::StoreIntegrity(_)
				| AuthError::EntropyUnavailable(_)
				| AuthError::Hashing(_)
				| AuthError::ConfigurationFault(_)
		)
	}

	/// True for authorization rejections.
	pub fn is_rejection(&self) -> bool {
		matches!(
			self,
			AuthError::InvalidAccessToken(_)
				| AuthError::NoRefreshCredential
				| AuthError::InvalidRefreshSecret
		)
	}

	/// HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			AuthError::Malformed(_) => 400,

			AuthError::InvalidAccessToken(_)
			| AuthError::NoRefreshCredential
			| AuthError::InvalidRefreshSecret => 401,

			AuthError::NotificationFailed(_)
			| AuthError::StoreUnavailable(_)
			| AuthError::StoreIntegrity(_)
			| AuthError::EntropyUnavailable(_)
			| AuthError::Hashing(_)
			| AuthError::ConfigurationFault(_) => 500,
		}
	}
}

impl From<StoreError> for AuthError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
			StoreError::Integrity(msg) => AuthError::StoreIntegrity(msg),
		}
	}
}

impl From<NotifyError> for AuthError {
	fn from(err: NotifyError) -> Self {
		AuthError::NotificationFailed(err.0)
	}
}

/// Signing key and encoding problems are configuration faults; everything
/// else is a rejected token.
impl From<TokenError> for AuthError {
	fn from(err: TokenError) -> Self {
		match err {
			TokenError::MissingSigningKey => AuthError::ConfigurationFault(err.to_string()),
			TokenError::Encoding(msg) => AuthError::ConfigurationFault(msg),
			other => AuthError::InvalidAccessToken(other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn malformed_is_400() {
		assert_eq!(AuthError::Malformed("x".into()).status_code(), 400);
	}

	#[test]
	fn rejections_share_401() {
		let rejections = [
			AuthError::InvalidAccessToken(TokenError::Expired),
			AuthError::InvalidAccessToken(TokenError::InvalidSignature),
			AuthError::InvalidAccessToken(TokenError::Malformed("x".into())),
			AuthError::NoRefreshCredential,
			AuthError::InvalidRefreshSecret,
		];
		for err in rejections {
			assert_eq!(err.status_code(), 401, "{err}");
			assert!(err.is_rejection());
			assert!(!err.is_internal());
		}
	}

	#[test]
	fn internal_faults_are_500() {
		let faults = [
			AuthError::NotificationFailed("smtp down".into()),
			AuthError::StoreUnavailable("locked".into()),
			AuthError::StoreIntegrity("2 rows".into()),
			AuthError::EntropyUnavailable("getrandom".into()),
			AuthError::Hashing("argon2".into()),
			AuthError::ConfigurationFault("no key".into()),
		];
		for err in faults {
			assert_eq!(err.status_code(), 500, "{err}");
			assert!(err.is_internal());
		}
	}

	#[test]
	fn missing_signing_key_maps_to_configuration_fault() {
		let err: AuthError = TokenError::MissingSigningKey.into();
		assert!(matches!(err, AuthError::ConfigurationFault(_)));
	}

	#[test]
	fn store_errors_keep_their_kind() {
		let err: AuthError = StoreError::Integrity("dup".into()).into();
		assert!(matches!(err, AuthError::StoreIntegrity(_)));
		let err: AuthError = StoreError::Unavailable("io".into()).into();
		assert!(matches!(err, AuthError::StoreUnavailable(_)));
	}
}
