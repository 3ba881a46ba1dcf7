// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Argon2id cost parameters for refresh secret hashing.
//!
//! Defaults match `Argon2::default()` (19456 KiB, 2 iterations, 1 lane).
//! Unit tests in this crate build hashers with [`HashCost::fast_insecure`] so
//! the protocol suites stay quick. That cost MUST NOT reach production.

use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::HashError;

/// Memory, time and lane cost of one Argon2id evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
	pub memory_kib: u32,
	pub iterations: u32,
	pub parallelism: u32,
}

impl Default for HashCost {
	fn default() -> Self {
		Self {
			memory_kib: Params::DEFAULT_M_COST,
			iterations: Params::DEFAULT_T_COST,
			parallelism: Params::DEFAULT_P_COST,
		}
	}
}

impl HashCost {
	/// 1 MiB, one pass. For tests only.
	pub fn fast_insecure() -> Self {
		Self {
			memory_kib: 1024,
			iterations: 1,
			parallelism: 1,
		}
	}

	/// Build an Argon2id v0x13 instance with this cost.
	pub(crate) fn argon2_instance(&self) -> Result<Argon2<'static>, HashError> {
		let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
			.map_err(|e| HashError::Hashing(format!("invalid argon2 params: {e}")))?;
		Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
	}
}
