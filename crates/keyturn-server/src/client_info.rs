// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request origin extraction.
//!
//! The origin bound into access tokens is the peer IP address, without the
//! port. Behind a reverse proxy, `trust_forwarded_headers` lets the proxy's
//! `X-Forwarded-For` / `X-Real-IP` headers override it.

use axum::{
	extract::{ConnectInfo, FromRequestParts},
	http::{request::Parts, HeaderMap},
};
use keyturn_server_auth::Origin;
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::api::AppState;

/// Origin of the current request. Never fails; falls back to
/// [`Origin::unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin(pub Origin);

impl FromRequestParts<AppState> for ClientOrigin {
	type Rejection = Infallible;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let peer = parts
			.extensions
			.get::<ConnectInfo<SocketAddr>>()
			.map(|ConnectInfo(addr)| *addr);

		let origin = resolve_origin(&parts.headers, peer, state.trust_forwarded_headers);
		tracing::debug!(origin = %origin, "request origin resolved");
		Ok(ClientOrigin(origin))
	}
}

/// Pick the origin for a request.
///
/// With `trust_forwarded_headers`, the first `X-Forwarded-For` entry wins,
/// then `X-Real-IP`, then the peer address.
pub fn resolve_origin(
	headers: &HeaderMap,
	peer: Option<SocketAddr>,
	trust_forwarded_headers: bool,
) -> Origin {
	if trust_forwarded_headers {
		if let Some(ip) = forwarded_client_ip(headers) {
			return Origin::new(ip);
		}
	}

	match peer {
		Some(addr) => Origin::new(addr.ip().to_string()),
		None => Origin::unknown(),
	}
}

fn forwarded_client_ip(headers: &HeaderMap) -> Option<String> {
	if let Some(xff) = headers.get("x-forwarded-for") {
		if let Ok(xff_str) = xff.to_str() {
			if let Some(first_ip) = xff_str.split(',').next() {
				let ip = first_ip.trim();
				if !ip.is_empty() {
					return Some(ip.to_string());
				}
			}
		}
	}

	if let Some(real_ip) = headers.get("x-real-ip") {
		if let Ok(ip) = real_ip.to_str() {
			let ip = ip.trim();
			if !ip.is_empty() {
				return Some(ip.to_string());
			}
		}
	}

	None
}
