// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration section.

use serde::{Deserialize, Serialize};

fn default_level() -> String {
	"info,tower_http=debug".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfigLayer {
	pub level: Option<String>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(default_level),
		}
	}
}

/// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` still wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
	pub level: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_level(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_level_includes_tower_http() {
		assert_eq!(LoggingConfig::default().level, "info,tower_http=debug");
	}

	#[test]
	fn merge_prefers_other() {
		let mut base = LoggingConfigLayer {
			level: Some("warn".to_string()),
		};
		base.merge(LoggingConfigLayer {
			level: Some("debug".to_string()),
		});
		assert_eq!(base.finalize().level, "debug");
	}

	#[test]
	fn merge_keeps_base_when_other_unset() {
		let mut base = LoggingConfigLayer {
			level: Some("warn".to_string()),
		};
		base.merge(LoggingConfigLayer::default());
		assert_eq!(base.finalize().level, "warn");
	}
}
