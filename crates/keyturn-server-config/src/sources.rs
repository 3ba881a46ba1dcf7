// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::env::load_secret_env;
use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer};

/// Default location of the TOML config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/keyturn/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: KEYTURN_SERVER_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			database: Some(load_database_from_env()?),
			auth: Some(load_auth_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Result<Option<bool>, ConfigError> {
	match env_var(name) {
		Some(v) => match v.to_ascii_lowercase().as_str() {
			"1" | "true" | "yes" => Ok(Some(true)),
			"0" | "false" | "no" => Ok(Some(false)),
			_ => Err(ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid boolean value '{v}'"),
			}),
		},
		None => Ok(None),
	}
}

fn env_parse<T: std::str::FromStr>(name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid {kind} value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("KEYTURN_SERVER_HOST"),
		port: env_parse("KEYTURN_SERVER_PORT", "u16")?,
		trust_forwarded_headers: env_bool("KEYTURN_SERVER_TRUST_FORWARDED_HEADERS")?,
	})
}

fn load_database_from_env() -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var("KEYTURN_SERVER_DATABASE_URL"),
	})
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		jwt_secret: load_secret_env("KEYTURN_SERVER_JWT_SECRET")
			.map_err(|e| ConfigError::Secret(e.to_string()))?,
		request_timeout_ms: env_parse("KEYTURN_SERVER_REQUEST_TIMEOUT_MS", "u64")?,
		hash_memory_kib: env_parse("KEYTURN_SERVER_HASH_MEMORY_KIB", "u32")?,
		hash_iterations: env_parse("KEYTURN_SERVER_HASH_ITERATIONS", "u32")?,
		hash_parallelism: env_parse("KEYTURN_SERVER_HASH_PARALLELISM", "u32")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	Ok(LoggingConfigLayer {
		level: env_var("KEYTURN_SERVER_LOG_LEVEL"),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::ENV_LOCK;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.http.is_none());
		assert!(layer.database.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let layer = TomlSource::new("/nonexistent/keyturn.toml").load().unwrap();
		assert!(layer.http.is_none());
	}

	#[test]
	fn test_toml_source_reads_sections() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[http]
port = 9443
trust_forwarded_headers = true

[database]
url = "sqlite:/var/lib/keyturn/keyturn.db"

[auth]
request_timeout_ms = 1500
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		let http = layer.http.unwrap();
		assert_eq!(http.port, Some(9443));
		assert_eq!(http.trust_forwarded_headers, Some(true));
		assert_eq!(layer.auth.unwrap().request_timeout_ms, Some(1500));
	}

	#[test]
	fn test_toml_source_reports_parse_errors() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "[http\nport = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_source_reads_and_validates() {
		let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

		std::env::set_var("KEYTURN_SERVER_PORT", "9001");
		std::env::set_var("KEYTURN_SERVER_TRUST_FORWARDED_HEADERS", "true");
		std::env::set_var("KEYTURN_SERVER_JWT_SECRET", "env-signing-key");
		let layer = EnvSource.load().unwrap();
		assert_eq!(layer.http.as_ref().unwrap().port, Some(9001));
		assert_eq!(layer.http.as_ref().unwrap().trust_forwarded_headers, Some(true));
		assert_eq!(
			layer.auth.unwrap().jwt_secret.unwrap().expose(),
			"env-signing-key"
		);

		std::env::set_var("KEYTURN_SERVER_PORT", "not-a-port");
		let err = EnvSource.load().unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "KEYTURN_SERVER_PORT"));

		std::env::remove_var("KEYTURN_SERVER_PORT");
		std::env::set_var("KEYTURN_SERVER_TRUST_FORWARDED_HEADERS", "maybe");
		assert!(EnvSource.load().is_err());

		std::env::remove_var("KEYTURN_SERVER_TRUST_FORWARDED_HEADERS");
		std::env::remove_var("KEYTURN_SERVER_JWT_SECRET");
	}
}
