// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access token issuance and refresh secret rotation for Keyturn.
//!
//! A client identified by an opaque [`Subject`] receives a [`TokenPair`]:
//!
//! - a short-lived HS512 access token binding the subject to the origin it
//!   was issued to ([`access_token`]);
//! - a long-lived refresh secret, of which only an Argon2id hash is stored
//!   ([`refresh_secret`], [`secret_hash`]).
//!
//! Each subject has at most one live refresh credential. Every issuance and
//! every successful refresh replaces it through [`RotationStore`], so a used
//! refresh secret cannot be replayed. A refresh arriving from a different
//! origin than the one in its access token is reported through [`Notifier`]
//! before the pair is rotated.
//!
//! ```ignore
//! let service = TokenService::new(codec, SecretHasher::new(), store, Arc::new(TracingNotifier));
//! let ctx = RequestContext::new(Origin::new("10.0.0.5"));
//! let pair = service.issue(&Subject::parse("u42")?, &ctx).await?;
//! let rotated = service
//! 	.refresh(&RefreshRequest { access_token: pair.access_token, refresh_secret: pair.refresh_secret }, &ctx)
//! 	.await?;
//! ```

pub mod access_token;
pub mod argon2_config;
pub mod clock;
pub mod error;
pub mod issuance;
pub mod notify;
pub mod refresh;
pub mod refresh_secret;
pub mod secret_hash;
pub mod service;
pub mod store;
pub mod types;

pub use access_token::{AccessClaims, TokenCodec, ACCESS_TOKEN_TTL_MINUTES};
pub use argon2_config::HashCost;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, HashError, NotifyError, StoreError, TokenError};
pub use notify::{Notifier, TracingNotifier};
pub use refresh_secret::{RefreshSecretGenerator, REFRESH_SECRET_BYTES};
pub use secret_hash::SecretHasher;
pub use service::TokenService;
pub use store::{InMemoryRotationStore, RotationStore};
pub use types::{
	Origin, RefreshCredential, RefreshRequest, RequestContext, Subject, TokenPair,
	DEFAULT_REQUEST_TIMEOUT,
};
