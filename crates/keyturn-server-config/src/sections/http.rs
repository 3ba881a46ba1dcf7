// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server configuration.

use serde::Deserialize;

/// HTTP server configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
	/// Derive client origins from `X-Forwarded-For` / `X-Real-IP`.
	///
	/// Only enable behind a proxy that overwrites these headers; otherwise
	/// clients choose their own origin.
	pub trust_forwarded_headers: bool,
}

impl Default for HttpConfig {
	fn default() -> Self {
		HttpConfigLayer::default().finalize()
	}
}

/// HTTP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub trust_forwarded_headers: Option<bool>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.trust_forwarded_headers.is_some() {
			self.trust_forwarded_headers = other.trust_forwarded_headers;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		HttpConfig {
			host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
			port: self.port.unwrap_or(8080),
			trust_forwarded_headers: self.trust_forwarded_headers.unwrap_or(false),
		}
	}
}
