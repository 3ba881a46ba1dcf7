// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persistence seam for refresh credentials.
//!
//! A [`RotationStore`] holds at most one [`RefreshCredential`] per subject.
//! `upsert_by_subject` must replace the row atomically: two concurrent
//! upserts for the same subject leave exactly one row, equal to one of them.
//! The SQLite implementation lives in `keyturn-server-db`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::types::{RefreshCredential, Subject};

#[async_trait]
pub trait RotationStore: Send + Sync {
	/// Insert or replace the credential for `credential.subject`.
	///
	/// Returns the number of rows written (1 on success).
	async fn upsert_by_subject(&self, credential: &RefreshCredential) -> Result<u64, StoreError>;

	/// Current credential for `subject`, if any.
	async fn fetch_by_subject(&self, subject: &Subject)
		-> Result<Option<RefreshCredential>, StoreError>;
}

/// Process-local store keyed by subject.
#[derive(Debug, Default)]
pub struct InMemoryRotationStore {
	rows: Mutex<HashMap<Subject, RefreshCredential>>,
}

impl InMemoryRotationStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored credentials.
	pub fn len(&self) -> usize {
		self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[async_trait]
impl RotationStore for InMemoryRotationStore {
	async fn upsert_by_subject(&self, credential: &RefreshCredential) -> Result<u64, StoreError> {
		let mut rows = self
			.rows
			.lock()
			.map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))?;
		rows.insert(credential.subject.clone(), credential.clone());
		Ok(1)
	}

	async fn fetch_by_subject(
		&self,
		subject: &Subject,
	) -> Result<Option<RefreshCredential>, StoreError> {
		let rows = self
			.rows
			.lock()
			.map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))?;
		Ok(rows.get(subject).cloned())
	}
}
