// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-way hashing of refresh secrets.
//!
//! Hashes are Argon2id PHC strings with a fresh random salt per call, so
//! hashing the same secret twice yields different strings. Verification reads
//! algorithm, version, cost and salt back out of the stored string and
//! compares in constant time.

use argon2::{
	password_hash::{
		rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier,
		SaltString,
	},
	Argon2,
};
use keyturn_common_secret::SecretString;
use tracing::instrument;

use crate::argon2_config::HashCost;
use crate::error::HashError;

/// Argon2id hasher for refresh secrets.
#[derive(Debug, Clone, Default)]
pub struct SecretHasher {
	argon2: Argon2<'static>,
}

impl SecretHasher {
	pub fn new() -> Self {
		Self::default()
	}

	/// Hasher with an explicit cost. Only affects new hashes.
	pub fn with_cost(cost: HashCost) -> Result<Self, HashError> {
		Ok(Self {
			argon2: cost.argon2_instance()?,
		})
	}

	/// Hash `secret` into a self-describing PHC string.
	#[instrument(name = "refresh_secret.hash", skip_all)]
	pub fn hash(&self, secret: &SecretString) -> Result<String, HashError> {
		let salt = SaltString::generate(&mut OsRng);
		self
			.argon2
			.hash_password(secret.expose().as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| HashError::Hashing(e.to_string()))
	}

	/// Check `secret` against a stored PHC string.
	///
	/// A mismatch is `Ok(false)`. A stored value that cannot be parsed is
	/// [`HashError::CorruptHash`], which callers must treat as a rejection.
	#[instrument(name = "refresh_secret.verify", skip_all)]
	pub fn verify(&self, secret: &SecretString, stored: &str) -> Result<bool, HashError> {
		let parsed = PasswordHash::new(stored).map_err(|e| HashError::CorruptHash(e.to_string()))?;

		match self.argon2.verify_password(secret.expose().as_bytes(), &parsed) {
			Ok(()) => Ok(true),
			Err(PasswordHashError::Password) => Ok(false),
			Err(e) => Err(HashError::CorruptHash(e.to_string())),
		}
	}
}
