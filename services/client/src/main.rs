use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod error;
mod models;
mod password;
mod repositories;
mod routes;
mod service;
mod settings;
mod state;
mod uploads;
mod validation;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;

use crate::{
    repositories::{PgClientRepository, client::MIGRATOR},
    service::RegistrationService,
    settings::ServerConfig,
    state::AppState,
    uploads::PhotoStorage,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting client service");

    let server_config = ServerConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &MIGRATOR).await?;

    let photos = PhotoStorage::new(&server_config.upload_dir, server_config.max_photo_bytes);
    photos.ensure_root().await?;

    let client_repository = Arc::new(PgClientRepository::new(pool));
    let app_state = AppState {
        registration: RegistrationService::new(client_repository),
        photos,
        body_limit: server_config.body_limit,
    };

    info!("Client service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state, &server_config);

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Client service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Client service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
