// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for Keyturn.
//!
//! Provides the pool and schema setup used by the server binary and
//! [`RefreshCredentialRepository`], the production
//! [`RotationStore`](keyturn_server_auth::RotationStore).

pub mod error;
pub mod pool;
pub mod refresh_credential;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DbError, Result};
pub use pool::{create_pool, ping, run_migrations};
pub use refresh_credential::RefreshCredentialRepository;
