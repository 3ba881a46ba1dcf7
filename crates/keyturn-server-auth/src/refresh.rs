// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Refresh: verify a presented pair, check its origin, rotate.
//!
//! Order of checks:
//!
//! 1. the access token must verify (signature, algorithm, expiry);
//! 2. the token's subject must have a stored refresh credential;
//! 3. the presented refresh secret must match the stored hash;
//! 4. if the request origin differs from the origin in the token, the
//!    notifier is told before anything is rotated;
//! 5. a new pair is minted and replaces the stored credential.
//!
//! Every rejection in 1-3 surfaces as a 401 at the transport; the precise
//! reason only reaches the logs.

use tracing::{error, info, instrument, warn};

use crate::error::{AuthError, HashError};
use crate::service::{within_store_deadline, TokenService};
use crate::types::{RefreshRequest, RequestContext, TokenPair};

impl TokenService {
	/// Exchange a valid pair for a new one.
	#[instrument(name = "token.refresh", skip_all, fields(origin = %ctx.origin))]
	pub async fn refresh(
		&self,
		request: &RefreshRequest,
		ctx: &RequestContext,
	) -> Result<TokenPair, AuthError> {
		let claims = self
			.codec
			.verify(&request.access_token, self.clock.now())
			.map_err(|e| {
				let err = AuthError::from(e);
				if err.is_rejection() {
					info!(error = %err, "refresh rejected: access token");
				}
				err
			})?;
		let subject = &claims.subject;

		let stored = within_store_deadline(ctx, self.store.fetch_by_subject(subject))
			.await?
			.ok_or_else(|| {
				info!(subject = %subject, "refresh rejected: no stored credential");
				AuthError::NoRefreshCredential
			})?;

		match self.hasher.verify(&request.refresh_secret, &stored.secret_hash) {
			Ok(true) => {}
			Ok(false) => {
				warn!(subject = %subject, "refresh rejected: refresh secret mismatch");
				return Err(AuthError::InvalidRefreshSecret);
			}
			Err(HashError::CorruptHash(reason)) | Err(HashError::Hashing(reason)) => {
				error!(subject = %subject, %reason, "stored refresh secret hash is unusable");
				return Err(AuthError::InvalidRefreshSecret);
			}
		}

		if claims.origin != ctx.origin {
			warn!(
				subject = %subject,
				token_origin = %claims.origin,
				request_origin = %ctx.origin,
				"refresh from a different origin"
			);
			match tokio::time::timeout(ctx.timeout, self.notifier.notify(subject)).await {
				Ok(result) => result?,
				Err(_) => {
					return Err(AuthError::NotificationFailed(format!(
						"notifier exceeded {}ms",
						ctx.timeout.as_millis()
					)))
				}
			}
		}

		let pair = self.mint(subject, ctx).await?;
		info!(subject = %subject, "rotated token pair");
		Ok(pair)
	}
}

#[cfg(test)]
mod tests {
	use crate::error::{AuthError, StoreError, TokenError};
	use crate::service::test_support::*;
	use crate::store::{InMemoryRotationStore, RotationStore};
	use crate::types::{Origin, RefreshCredential, RefreshRequest, TokenPair};
	use chrono::Duration;
	use keyturn_common_secret::SecretString;
	use std::sync::Arc;
	use std::time::Duration as StdDuration;

	fn request(pair: &TokenPair) -> RefreshRequest {
		RefreshRequest {
			access_token: pair.access_token.clone(),
			refresh_secret: pair.refresh_secret.clone(),
		}
	}

	mod rotation {
		use super::*;

		#[tokio::test]
		async fn issue_then_refresh_scenario() {
			let h = harness();
			let ctx = ctx("10.0.0.5");
			let first = h.service.issue(&subject("u42"), &ctx).await.unwrap();

			let second = h.service.refresh(&request(&first), &ctx).await.unwrap();
			assert_ne!(second.refresh_secret, first.refresh_secret);

			let claims = h.service.codec().verify(&second.access_token, t0()).unwrap();
			assert_eq!(claims.subject, subject("u42"));
			assert_eq!(claims.origin, Origin::new("10.0.0.5"));

			let replay = h.service.refresh(&request(&first), &ctx).await.unwrap_err();
			assert!(matches!(replay, AuthError::InvalidRefreshSecret));
		}

		#[tokio::test]
		async fn rotated_pair_can_refresh_again() {
			let h = harness();
			let ctx = ctx("10.0.0.5");
			let first = h.service.issue(&subject("u42"), &ctx).await.unwrap();
			let second = h.service.refresh(&request(&first), &ctx).await.unwrap();
			let third = h.service.refresh(&request(&second), &ctx).await.unwrap();

			assert_ne!(third.refresh_secret, second.refresh_secret);
			assert_eq!(h.store.len(), 1);
		}

		#[tokio::test]
		async fn same_origin_does_not_notify() {
			let h = harness();
			let ctx = ctx("10.0.0.5");
			let pair = h.service.issue(&subject("u42"), &ctx).await.unwrap();
			h.service.refresh(&request(&pair), &ctx).await.unwrap();
			assert_eq!(h.notifier.count(), 0);
		}

		#[tokio::test]
		async fn new_origin_notifies_once_and_still_rotates() {
			let h = harness();
			let pair = h.service.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap();

			let rotated = h
				.service
				.refresh(&request(&pair), &ctx("203.0.113.9"))
				.await
				.unwrap();

			assert_eq!(h.notifier.count(), 1);
			assert_eq!(h.notifier.calls.lock().unwrap()[0], subject("u42"));

			let claims = h.service.codec().verify(&rotated.access_token, t0()).unwrap();
			assert_eq!(claims.origin, Origin::new("203.0.113.9"));
			let row = h.store.fetch_by_subject(&subject("u42")).await.unwrap().unwrap();
			assert_eq!(row.origin, Origin::new("203.0.113.9"));
		}
	}

	mod rejection {
		use super::*;

		#[tokio::test]
		async fn expired_access_token_is_rejected_even_with_valid_secret() {
			let h = harness();
			let ctx = ctx("10.0.0.5");
			let pair = h.service.issue(&subject("u42"), &ctx).await.unwrap();

			h.clock.advance(Duration::minutes(16));
			let err = h.service.refresh(&request(&pair), &ctx).await.unwrap_err();
			assert!(matches!(
				err,
				AuthError::InvalidAccessToken(TokenError::Expired)
			));
			assert_eq!(err.status_code(), 401);
		}

		#[tokio::test]
		async fn valid_until_exact_expiry() {
			let h = harness();
			let ctx = ctx("10.0.0.5");
			let pair = h.service.issue(&subject("u42"), &ctx).await.unwrap();

			h.clock.advance(Duration::minutes(15));
			assert!(h.service.refresh(&request(&pair), &ctx).await.is_ok());
		}

		#[tokio::test]
		async fn garbage_access_token_is_malformed() {
			let h = harness();
			let pair = h.service.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap();
			let req = RefreshRequest {
				access_token: "invalid.token.string".to_string(),
				refresh_secret: pair.refresh_secret.clone(),
			};
			let err = h.service.refresh(&req, &ctx("10.0.0.5")).await.unwrap_err();
			assert!(matches!(
				err,
				AuthError::InvalidAccessToken(TokenError::Malformed(_))
			));
		}

		#[tokio::test]
		async fn token_from_other_key_is_invalid_signature() {
			let h = harness();
			let other = service_with(
				Arc::new(InMemoryRotationStore::new()),
				Arc::new(RecordingNotifier::default()),
				"another_secret",
			);
			let foreign = other.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap();

			let err = h.service.refresh(&request(&foreign), &ctx("10.0.0.5")).await.unwrap_err();
			assert!(matches!(
				err,
				AuthError::InvalidAccessToken(TokenError::InvalidSignature)
			));
		}

		#[tokio::test]
		async fn unknown_subject_has_no_credential() {
			let h = harness();
			let other = service_with(
				Arc::new(InMemoryRotationStore::new()),
				Arc::new(RecordingNotifier::default()),
				"test_secret_key",
			);
			// Same key, but the credential only exists in the other store.
			let pair = other.issue(&subject("ghost"), &ctx("10.0.0.5")).await.unwrap();

			let err = h.service.refresh(&request(&pair), &ctx("10.0.0.5")).await.unwrap_err();
			assert!(matches!(err, AuthError::NoRefreshCredential));
		}

		#[tokio::test]
		async fn wrong_refresh_secret_is_rejected() {
			let h = harness();
			let pair = h.service.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap();
			let req = RefreshRequest {
				access_token: pair.access_token.clone(),
				refresh_secret: SecretString::new("not-the-secret".to_string()),
			};
			let err = h.service.refresh(&req, &ctx("10.0.0.5")).await.unwrap_err();
			assert!(matches!(err, AuthError::InvalidRefreshSecret));
		}

		#[tokio::test]
		async fn corrupt_stored_hash_is_rejected_not_internal() {
			let h = harness();
			let pair = h.service.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap();
			h.store
				.upsert_by_subject(&RefreshCredential {
					subject: subject("u42"),
					secret_hash: "plaintext-not-a-phc-string".to_string(),
					origin: Origin::new("10.0.0.5"),
					updated_at: t0(),
				})
				.await
				.unwrap();

			let err = h.service.refresh(&request(&pair), &ctx("10.0.0.5")).await.unwrap_err();
			assert!(matches!(err, AuthError::InvalidRefreshSecret));
		}

		#[tokio::test]
		async fn rejection_does_not_notify_or_rotate() {
			let h = harness();
			let pair = h.service.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap();
			let before = h.store.fetch_by_subject(&subject("u42")).await.unwrap();

			let req = RefreshRequest {
				access_token: pair.access_token.clone(),
				refresh_secret: SecretString::new("not-the-secret".to_string()),
			};
			let _ = h.service.refresh(&req, &ctx("198.51.100.7")).await;

			assert_eq!(h.notifier.count(), 0);
			assert_eq!(h.store.fetch_by_subject(&subject("u42")).await.unwrap(), before);
		}
	}

	mod collaborator_failures {
		use super::*;

		/// Store seeded through a working service, then swapped for the
		/// refresh call.
		async fn issued_pair() -> TokenPair {
			let h = harness();
			h.service.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap()
		}

		#[tokio::test]
		async fn failing_notifier_aborts_refresh() {
			let store = Arc::new(InMemoryRotationStore::new());
			let seed = service_with(store.clone(), Arc::new(RecordingNotifier::default()), "test_secret_key");
			let pair = seed.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap();
			let before = store.fetch_by_subject(&subject("u42")).await.unwrap();

			let service = service_with(store.clone(), Arc::new(FailingNotifier), "test_secret_key");
			let err = service.refresh(&request(&pair), &ctx("203.0.113.9")).await.unwrap_err();

			assert!(matches!(err, AuthError::NotificationFailed(_)));
			assert_eq!(err.status_code(), 500);
			assert_eq!(store.fetch_by_subject(&subject("u42")).await.unwrap(), before);
		}

		#[tokio::test(start_paused = true)]
		async fn hanging_notifier_times_out() {
			let store = Arc::new(InMemoryRotationStore::new());
			let seed = service_with(store.clone(), Arc::new(RecordingNotifier::default()), "test_secret_key");
			let pair = seed.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap();

			let service = service_with(store, Arc::new(HangingNotifier), "test_secret_key");
			let ctx = ctx("203.0.113.9").with_timeout(StdDuration::from_millis(100));
			let err = service.refresh(&request(&pair), &ctx).await.unwrap_err();
			assert!(matches!(err, AuthError::NotificationFailed(_)));
		}

		#[tokio::test]
		async fn hanging_notifier_is_not_called_for_same_origin() {
			let store = Arc::new(InMemoryRotationStore::new());
			let seed = service_with(store.clone(), Arc::new(RecordingNotifier::default()), "test_secret_key");
			let pair = seed.issue(&subject("u42"), &ctx("10.0.0.5")).await.unwrap();

			let service = service_with(store, Arc::new(HangingNotifier), "test_secret_key");
			assert!(service.refresh(&request(&pair), &ctx("10.0.0.5")).await.is_ok());
		}

		#[tokio::test]
		async fn store_failure_fails_refresh() {
			let pair = issued_pair().await;
			let service = service_with(
				Arc::new(FailingStore(StoreError::Unavailable("database is locked".into()))),
				Arc::new(RecordingNotifier::default()),
				"test_secret_key",
			);
			let err = service.refresh(&request(&pair), &ctx("10.0.0.5")).await.unwrap_err();
			assert!(matches!(err, AuthError::StoreUnavailable(_)));
		}

		#[tokio::test]
		async fn store_integrity_error_is_internal() {
			let pair = issued_pair().await;
			let service = service_with(
				Arc::new(FailingStore(StoreError::Integrity("2 rows for subject".into()))),
				Arc::new(RecordingNotifier::default()),
				"test_secret_key",
			);
			let err = service.refresh(&request(&pair), &ctx("10.0.0.5")).await.unwrap_err();
			assert!(matches!(err, AuthError::StoreIntegrity(_)));
			assert!(err.is_internal());
		}

		#[tokio::test(start_paused = true)]
		async fn store_timeout_fails_refresh() {
			let pair = issued_pair().await;
			let service = service_with(
				Arc::new(HangingStore),
				Arc::new(RecordingNotifier::default()),
				"test_secret_key",
			);
			let ctx = ctx("10.0.0.5").with_timeout(StdDuration::from_millis(100));
			let err = service.refresh(&request(&pair), &ctx).await.unwrap_err();
			assert!(matches!(err, AuthError::StoreUnavailable(_)));
		}

		#[tokio::test]
		async fn missing_signing_key_is_configuration_fault() {
			let pair = issued_pair().await;
			let service = service_with(
				Arc::new(InMemoryRotationStore::new()),
				Arc::new(RecordingNotifier::default()),
				"",
			);
			let err = service.refresh(&request(&pair), &ctx("10.0.0.5")).await.unwrap_err();
			assert!(matches!(err, AuthError::ConfigurationFault(_)));
		}
	}

	mod concurrency {
		use super::*;

		#[tokio::test]
		async fn concurrent_refreshes_leave_one_valid_secret() {
			let inner = Arc::new(InMemoryRotationStore::new());
			let gated = Arc::new(GatedStore::new(inner.clone(), 2));
			let notifier = Arc::new(RecordingNotifier::default());
			let service = service_with(gated, notifier, "test_secret_key");
			let ctx = ctx("10.0.0.5");

			// Issuance never fetches, so the gate is untouched here.
			let pair = service.issue(&subject("u42"), &ctx).await.unwrap();
			let req = request(&pair);

			// Both calls read the original row before either rotates it.
			let (a, b) = tokio::join!(service.refresh(&req, &ctx), service.refresh(&req, &ctx));
			let a = a.unwrap();
			let b = b.unwrap();
			assert_ne!(a.refresh_secret, b.refresh_secret);

			let row = inner.fetch_by_subject(&subject("u42")).await.unwrap().unwrap();
			let hasher = fast_hasher();
			let valid = [&a, &b]
				.into_iter()
				.filter(|p| hasher.verify(&p.refresh_secret, &row.secret_hash) == Ok(true))
				.count();

			assert_eq!(valid, 1);
			assert_eq!(hasher.verify(&pair.refresh_secret, &row.secret_hash), Ok(false));
			assert_eq!(inner.len(), 1);
		}
	}
}
