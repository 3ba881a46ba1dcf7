// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use keyturn_server_auth::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	/// A stored row could not be mapped back into a credential.
	#[error("Invalid data: {0}")]
	InvalidData(String),

	/// More rows than the one-per-subject invariant allows.
	#[error("Integrity violation: {0}")]
	Integrity(String),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for StoreError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::Integrity(msg) => StoreError::Integrity(msg),
			DbError::InvalidData(msg) => StoreError::Integrity(msg),
			other => StoreError::Unavailable(other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integrity_keeps_its_kind() {
		let err: StoreError = DbError::Integrity("2 rows for u1".into()).into();
		assert_eq!(err, StoreError::Integrity("2 rows for u1".into()));
	}

	#[test]
	fn driver_errors_are_unavailable() {
		let err: StoreError = DbError::Sqlx(sqlx::Error::PoolTimedOut).into();
		assert!(matches!(err, StoreError::Unavailable(_)));
	}
}
