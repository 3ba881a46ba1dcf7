// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Refresh credential database.
//!
//! Keyturn only speaks SQLite. The URL uses sqlx's form: `sqlite:<path>`,
//! `sqlite://<path>` or `sqlite::memory:`, optionally followed by
//! `?mode=...` query options. A relative path is resolved against the
//! working directory; the file is created on first start.

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_DATABASE_URL: &str = "sqlite:./keyturn.db";
const SQLITE_SCHEME: &str = "sqlite:";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	pub url: String,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_DATABASE_URL.to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
	}

	/// Resolve the URL, rejecting anything that is not a SQLite URL so a
	/// misconfigured deployment fails at startup rather than on first connect.
	pub fn finalize(self) -> Result<DatabaseConfig, ConfigError> {
		let url = self.url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
		if !url.starts_with(SQLITE_SCHEME) || url.len() == SQLITE_SCHEME.len() {
			return Err(ConfigError::InvalidValue {
				key: "database.url".to_string(),
				message: format!("expected a sqlite: URL, got '{url}'"),
			});
		}
		Ok(DatabaseConfig { url })
	}
}
