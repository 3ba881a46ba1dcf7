// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token signing and refresh-secret hashing configuration.
//!
//! The signing key is only ever read from `KEYTURN_SERVER_JWT_SECRET` or
//! `KEYTURN_SERVER_JWT_SECRET_FILE`; a `jwt_secret` key in TOML is ignored.

use keyturn_common_secret::SecretString;
use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19_456;
pub const DEFAULT_HASH_ITERATIONS: u32 = 2;
pub const DEFAULT_HASH_PARALLELISM: u32 = 1;

/// Auth configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// HS512 signing key. Empty when none was configured.
	pub jwt_secret: SecretString,
	/// Budget for each store and notifier call.
	pub request_timeout: Duration,
	pub hash_memory_kib: u32,
	pub hash_iterations: u32,
	pub hash_parallelism: u32,
}

impl AuthConfig {
	pub fn has_jwt_secret(&self) -> bool {
		!self.jwt_secret.is_empty()
	}
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			jwt_secret: SecretString::new(String::new()),
			request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
			hash_memory_kib: DEFAULT_HASH_MEMORY_KIB,
			hash_iterations: DEFAULT_HASH_ITERATIONS,
			hash_parallelism: DEFAULT_HASH_PARALLELISM,
		}
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(skip)]
	pub jwt_secret: Option<SecretString>,
	#[serde(default)]
	pub request_timeout_ms: Option<u64>,
	#[serde(default)]
	pub hash_memory_kib: Option<u32>,
	#[serde(default)]
	pub hash_iterations: Option<u32>,
	#[serde(default)]
	pub hash_parallelism: Option<u32>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.jwt_secret.is_some() {
			self.jwt_secret = other.jwt_secret;
		}
		if other.request_timeout_ms.is_some() {
			self.request_timeout_ms = other.request_timeout_ms;
		}
		if other.hash_memory_kib.is_some() {
			self.hash_memory_kib = other.hash_memory_kib;
		}
		if other.hash_iterations.is_some() {
			self.hash_iterations = other.hash_iterations;
		}
		if other.hash_parallelism.is_some() {
			self.hash_parallelism = other.hash_parallelism;
		}
	}

	pub fn finalize(self) -> Result<AuthConfig, ConfigError> {
		let timeout_ms = self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
		if timeout_ms == 0 {
			return Err(ConfigError::InvalidValue {
				key: "auth.request_timeout_ms".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}

		let hash_iterations = self.hash_iterations.unwrap_or(DEFAULT_HASH_ITERATIONS);
		if hash_iterations == 0 {
			return Err(ConfigError::InvalidValue {
				key: "auth.hash_iterations".to_string(),
				message: "must be at least 1".to_string(),
			});
		}

		let hash_parallelism = self.hash_parallelism.unwrap_or(DEFAULT_HASH_PARALLELISM);
		if hash_parallelism == 0 {
			return Err(ConfigError::InvalidValue {
				key: "auth.hash_parallelism".to_string(),
				message: "must be at least 1".to_string(),
			});
		}

		// Argon2 needs at least 8 KiB per lane.
		let hash_memory_kib = self.hash_memory_kib.unwrap_or(DEFAULT_HASH_MEMORY_KIB);
		let min_memory_kib = hash_parallelism.saturating_mul(8);
		if hash_memory_kib < min_memory_kib {
			return Err(ConfigError::InvalidValue {
				key: "auth.hash_memory_kib".to_string(),
				message: format!("must be at least {min_memory_kib} for {hash_parallelism} lane(s)"),
			});
		}

		Ok(AuthConfig {
			jwt_secret: self.jwt_secret.unwrap_or_else(|| SecretString::new(String::new())),
			request_timeout: Duration::from_millis(timeout_ms),
			hash_memory_kib,
			hash_iterations,
			hash_parallelism,
		})
	}
}
