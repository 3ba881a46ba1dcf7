// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Refresh secret generation.
//!
//! A refresh secret is [`REFRESH_SECRET_BYTES`] bytes from the operating
//! system CSPRNG, encoded as padded URL-safe base64 (44 characters). The raw
//! value is handed to the client once and only its hash is persisted.

use base64::{engine::general_purpose::URL_SAFE, Engine};
use keyturn_common_secret::SecretString;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

use crate::error::AuthError;

/// Entropy per refresh secret.
pub const REFRESH_SECRET_BYTES: usize = 32;

/// Encoded length of a refresh secret.
pub const REFRESH_SECRET_ENCODED_LEN: usize = 44;

/// Generates refresh secrets from the OS random source.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefreshSecretGenerator;

impl RefreshSecretGenerator {
	pub fn new() -> Self {
		Self
	}

	/// Produce a fresh secret, failing rather than falling back to a weaker
	/// source when the OS cannot supply entropy.
	pub fn generate(&self) -> Result<SecretString, AuthError> {
		let mut bytes = [0u8; REFRESH_SECRET_BYTES];
		OsRng
			.try_fill_bytes(&mut bytes)
			.map_err(|e| AuthError::EntropyUnavailable(e.to_string()))?;

		let encoded = URL_SAFE.encode(bytes);
		bytes.zeroize();
		Ok(SecretString::new(encoded))
	}
}
