// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Refresh credential repository.
//!
//! One row per subject in `refresh_credentials`. Rows are only ever replaced,
//! never deleted; replacing a row is what invalidates the previous refresh
//! secret.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyturn_server_auth::{Origin, RefreshCredential, RotationStore, StoreError, Subject};
use sqlx::sqlite::SqlitePool;

use crate::error::{DbError, Result};

/// SQLite-backed [`RotationStore`].
#[derive(Clone)]
pub struct RefreshCredentialRepository {
	pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct RefreshCredentialRow {
	subject: String,
	secret_hash: String,
	origin: String,
	updated_at: String,
}

impl TryFrom<RefreshCredentialRow> for RefreshCredential {
	type Error = DbError;

	fn try_from(row: RefreshCredentialRow) -> Result<Self> {
		Ok(RefreshCredential {
			subject: Subject::parse(row.subject)
				.map_err(|e| DbError::InvalidData(format!("invalid subject: {e}")))?,
			secret_hash: row.secret_hash,
			origin: Origin::new(row.origin),
			updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
				.map_err(|e| DbError::InvalidData(format!("invalid updated_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

impl RefreshCredentialRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert or replace the subject's credential in a single statement.
	///
	/// Concurrent calls for the same subject serialize on the primary key;
	/// the last commit wins and exactly one row remains.
	#[tracing::instrument(skip(self, credential), fields(subject = %credential.subject))]
	pub async fn upsert(&self, credential: &RefreshCredential) -> Result<u64> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			INSERT INTO refresh_credentials (subject, secret_hash, origin, updated_at)
			VALUES (?, ?, ?, ?)
			ON CONFLICT(subject) DO UPDATE SET
				secret_hash = excluded.secret_hash,
				origin = excluded.origin,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(credential.subject.as_str())
		.bind(&credential.secret_hash)
		.bind(credential.origin.as_str())
		.bind(credential.updated_at.to_rfc3339())
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		tracing::debug!(rows = result.rows_affected(), "refresh credential upserted");
		Ok(result.rows_affected())
	}

	/// Current credential for `subject`.
	///
	/// More than one row is reported as [`DbError::Integrity`] rather than
	/// picking one.
	#[tracing::instrument(skip(self), fields(subject = %subject))]
	pub async fn get_by_subject(&self, subject: &Subject) -> Result<Option<RefreshCredential>> {
		let mut rows: Vec<RefreshCredentialRow> = sqlx::query_as(
			r#"
			SELECT subject, secret_hash, origin, updated_at
			FROM refresh_credentials
			WHERE subject = ?
			"#,
		)
		.bind(subject.as_str())
		.fetch_all(&self.pool)
		.await?;

		match rows.len() {
			0 => Ok(None),
			1 => rows.pop().map(RefreshCredential::try_from).transpose(),
			n => {
				tracing::error!(rows = n, "multiple refresh credentials for one subject");
				Err(DbError::Integrity(format!(
					"{n} refresh credentials stored for one subject"
				)))
			}
		}
	}
}

#[async_trait]
impl RotationStore for RefreshCredentialRepository {
	async fn upsert_by_subject(&self, credential: &RefreshCredential) -> std::result::Result<u64, StoreError> {
		Ok(self.upsert(credential).await?)
	}

	async fn fetch_by_subject(
		&self,
		subject: &Subject,
	) -> std::result::Result<Option<RefreshCredential>, StoreError> {
		Ok(self.get_by_subject(subject).await?)
	}
}
