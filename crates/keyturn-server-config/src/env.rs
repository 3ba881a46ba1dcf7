// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret loading with the `VAR` / `VAR_FILE` convention.
//!
//! `VAR_FILE` wins over `VAR` so that Docker and Kubernetes secret mounts can
//! be used without putting the signing key in the process environment.

use std::path::PathBuf;
use std::{env, fs};

use keyturn_common_secret::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Load `var` from `{var}_FILE` if set, else from `{var}` itself.
///
/// A single trailing newline is stripped from file contents.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|e| SecretEnvError::Io {
			path: path.clone(),
			source: e,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(SecretString::new(secret)));
	}

	if let Ok(value) = env::var(var) {
		return Ok(Some(SecretString::new(value)));
	}

	Ok(None)
}
