// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Injectable wall clock.

use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

/// Source of the current time for token issuance and expiry checks.
pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A manually driven clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
	now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
	pub fn new(start: DateTime<Utc>) -> Self {
		Self {
			now: RwLock::new(start),
		}
	}

	/// Move the clock forward by `by`.
	pub fn advance(&self, by: Duration) {
		let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
		*now += by;
	}

	pub fn set(&self, to: DateTime<Utc>) {
		*self.now.write().unwrap_or_else(|e| e.into_inner()) = to;
	}
}

impl Clock for ManualClock {
	fn now(&self) -> DateTime<Utc> {
		*self.now.read().unwrap_or_else(|e| e.into_inner())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn manual_clock_advances() {
		let start = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
		let clock = ManualClock::new(start);
		clock.advance(Duration::minutes(16));
		assert_eq!(clock.now(), start + Duration::minutes(16));

		clock.set(start);
		assert_eq!(clock.now(), start);
	}

	#[test]
	fn system_clock_is_close_to_utc_now() {
		let diff = (SystemClock.now() - Utc::now()).num_seconds().abs();
		assert!(diff < 2);
	}
}
