// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core value types shared by the issuance and refresh protocols.
//!
//! - [`Subject`]: opaque caller-supplied identifier the tokens represent
//! - [`Origin`]: network origin of a request as seen by the server
//! - [`RefreshCredential`]: the single stored row per subject
//! - [`TokenPair`]: what both protocols hand back to the caller
//! - [`RequestContext`]: per-request origin and collaborator time budget

use chrono::{DateTime, Utc};
use keyturn_common_secret::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::AuthError;

/// Default budget for a single store or notifier call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Opaque identifier of the entity tokens are issued for.
///
/// Untrusted input. The only validation is that it is not empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
	/// Parse a caller-supplied subject, rejecting the empty string.
	pub fn parse(raw: impl Into<String>) -> Result<Self, AuthError> {
		let raw = raw.into();
		if raw.is_empty() {
			return Err(AuthError::Malformed("subject must not be empty".to_string()));
		}
		Ok(Self(raw))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Subject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Network origin of a request (typically the client IP address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
	/// Placeholder used when the transport cannot determine an origin.
	pub const UNKNOWN: &'static str = "unknown";

	pub fn new(origin: impl Into<String>) -> Self {
		Self(origin.into())
	}

	pub fn unknown() -> Self {
		Self(Self::UNKNOWN.to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Origin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// The stored half of a refresh token: one row per subject.
///
/// `secret_hash` is an Argon2 PHC string; the raw secret is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCredential {
	pub subject: Subject,
	pub secret_hash: String,
	/// Origin of the request that installed this credential.
	pub origin: Origin,
	pub updated_at: DateTime<Utc>,
}

/// Access token plus raw refresh secret, returned exactly once per issuance.
#[derive(Debug, Clone)]
pub struct TokenPair {
	pub access_token: String,
	pub refresh_secret: SecretString,
}

/// A refresh exchange as presented by the client.
#[derive(Debug, Clone)]
pub struct RefreshRequest {
	pub access_token: String,
	pub refresh_secret: SecretString,
}

/// Per-request data supplied by the transport.
#[derive(Debug, Clone)]
pub struct RequestContext {
	pub origin: Origin,
	/// Upper bound for each blocking collaborator call (store, notifier).
	pub timeout: Duration,
}

impl RequestContext {
	pub fn new(origin: Origin) -> Self {
		Self {
			origin,
			timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}
}
