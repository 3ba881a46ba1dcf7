// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wrapper for values that must never reach a log line or a response dump.
//!
//! Keyturn handles two kinds of such values: the HMAC signing key loaded at
//! startup and the raw refresh secrets handed to clients exactly once. Both
//! travel inside [`Secret<T>`], which
//!
//! - formats as `[REDACTED]` under `Debug` and `Display`,
//! - serializes as `"[REDACTED]"` (deserialization is transparent),
//! - zeroes its memory on drop,
//! - hands out the value only through [`Secret::expose`].
//!
//! ```
//! use keyturn_common_secret::SecretString;
//!
//! let refresh = SecretString::new("p4W1r...".to_string());
//! assert_eq!(format!("{refresh}"), "[REDACTED]");
//! assert_eq!(refresh.expose(), "p4W1r...");
//! ```
//!
//! Structured logging goes through `Display`/`Debug`, so
//! `tracing::info!(secret = %s)` and `tracing::info!(?s)` both stay redacted.

use std::fmt;
use zeroize::Zeroize;

/// Placeholder printed instead of the wrapped value.
pub const REDACTED: &str = "[REDACTED]";

/// A sensitive value with redacted formatting and zeroize-on-drop.
///
/// There is no `Deref`; reading the value requires a visible `.expose()`.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// The common case: a secret string.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Borrow the wrapped value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl SecretString {
	/// Length in bytes of the wrapped string. Safe to log.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	/// True when the wrapped string is empty. Safe to log.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Secret::new(value)
	}
}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}
