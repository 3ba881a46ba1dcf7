// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP transport for Keyturn.
//!
//! Exposes the issuance and refresh protocols of
//! [`keyturn_server_auth::TokenService`] as JSON endpoints:
//!
//! - `POST /token` issues a pair for a subject
//! - `POST /refresh` rotates a pair
//! - `GET /health` probes the database
//!
//! The request origin is derived by [`client_info::ClientOrigin`].

pub mod api;
pub mod client_info;
pub mod error;
pub mod routes;

pub use api::{create_app_state, create_app_state_with, create_router, AppState};
pub use client_info::ClientOrigin;
pub use error::{ErrorResponse, ServerError};

pub use keyturn_server_db as db;
