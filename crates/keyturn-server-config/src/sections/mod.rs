// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod auth;
mod database;
mod http;
mod logging;

pub use auth::*;
pub use database::*;
pub use http::*;
pub use logging::*;
