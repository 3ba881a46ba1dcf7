// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::pool::run_migrations;

/// Single-connection in-memory pool. Every new connection to `:memory:` is a
/// fresh database, so the pool must never open a second one.
pub async fn create_test_pool() -> SqlitePool {
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect(":memory:")
		.await
		.unwrap()
}

/// In-memory pool with the schema applied.
pub async fn create_credential_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}
