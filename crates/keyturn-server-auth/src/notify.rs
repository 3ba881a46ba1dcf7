// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Out-of-band warnings about suspicious refreshes.

use async_trait::async_trait;
use tracing::warn;

use crate::error::NotifyError;
use crate::types::Subject;

/// Channel used when a refresh arrives from a different origin than the one
/// bound into its access token.
#[async_trait]
pub trait Notifier: Send + Sync {
	async fn notify(&self, subject: &Subject) -> Result<(), NotifyError>;
}

/// Emits a `security` warning event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
	async fn notify(&self, subject: &Subject) -> Result<(), NotifyError> {
		warn!(
			target: "security",
			subject = %subject,
			"refresh requested from a new origin"
		);
		Ok(())
	}
}
