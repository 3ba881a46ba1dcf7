// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Keyturn server.
//!
//! Layered from defaults, an optional TOML file and `KEYTURN_SERVER_*`
//! environment variables (highest precedence). The HS512 signing key comes
//! only from `KEYTURN_SERVER_JWT_SECRET` or `KEYTURN_SERVER_JWT_SECRET_FILE`.
//!
//! # Usage
//!
//! ```ignore
//! use keyturn_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use env::{load_secret_env, SecretEnvError};
pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`KEYTURN_SERVER_*`)
/// 2. Config file (`/etc/keyturn/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource)])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize()?;
	let auth = layer.auth.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		host = %http.host,
		port = http.port,
		trust_forwarded_headers = http.trust_forwarded_headers,
		database = %database.url,
		jwt_secret_configured = auth.has_jwt_secret(),
		request_timeout_ms = auth.request_timeout.as_millis() as u64,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		auth,
		logging,
	})
}
