use std::net::SocketAddr;
use std::sync::Arc;

use projects_leads::{
	config::{Settings, SettingsError},
	db::{build_pool, run_migrations, BuildPoolError, RunMigrationsError},
	endpoints::router,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MainError {
	#[error("LoadSettings: {source}")]
	LoadSettings {
		#[source]
		source: SettingsError,
	},
	#[error("TracingInit: {source}")]
	TracingInit {
		#[source]
		source: utils_trace::TracingInitError,
	},
	#[error("BuildPool: {source}")]
	BuildPool {
		#[source]
		source: BuildPoolError,
	},
	#[error("GetConnectionFromPool: {source}")]
	GetConnectionFromPool {
		#[source]
		source: r2d2::Error,
	},
	#[error("RunMigrations: {source}")]
	RunMigrations {
		#[source]
		source: RunMigrationsError,
	},
	#[error("TcpListenerBind: {source}")]
	TcpListenerBind {
		#[source]
		source: std::io::Error,
	},
	#[error("Serve: {source}")]
	Serve {
		#[source]
		source: std::io::Error,
	}
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
	let settings = Settings::from_env()
		.map_err(|source| MainError::LoadSettings { source })?;

	utils_trace::init(&settings.log_level, settings.log_format)
		.map_err(|source| MainError::TracingInit { source })?;

	let pool = build_pool(
		&settings.database_url,
		settings.database_pool_size,
		settings.database_connect_timeout,
	)
	.map_err(|source| MainError::BuildPool { source })?;

	{
		let mut conn = pool
			.get()
			.map_err(|source| MainError::GetConnectionFromPool { source })?;
		let applied = run_migrations(&mut conn)
			.map_err(|source| MainError::RunMigrations { source })?;
		info!(applied, "database migrations up to date");
	}

	info!(queue = ?settings.scrape.queue, "scrape queue selected");

	// Set up the router
	let app = router(pool, Arc::new(settings.scrape));

	let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
	let listener = tokio::net::TcpListener::bind(addr)
		.await
		.map_err(|source| MainError::TcpListenerBind { source })?;

	info!("Server is listening on addr: {}", addr);

	axum::serve(listener, app)
		.await
		.map_err(|source| MainError::Serve { source })?;

	Ok(())
}
