// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Keyturn token server binary.

use clap::Parser;
use keyturn_server::{create_app_state, create_router};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Keyturn server - issues and rotates access/refresh token pairs.
#[derive(Parser, Debug)]
#[command(name = "keyturn-server", about = "Keyturn token server", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/keyturn/server.toml).
	#[arg(long, env = "KEYTURN_SERVER_CONFIG")]
	config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match args.config {
		Some(path) => keyturn_server_config::load_config_with_file(path)?,
		None => keyturn_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting keyturn-server"
	);

	let pool = keyturn_server::db::create_pool(&config.database.url).await?;
	keyturn_server::db::run_migrations(&pool).await?;

	let state = create_app_state(pool, &config)?;
	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	let listener = tokio::net::TcpListener::bind(&addr).await?;
	tracing::info!(addr = %addr, "listening");

	tokio::select! {
		result = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
