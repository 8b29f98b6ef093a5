use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use api::{build_router, ApiState};
use axum::Router;
use common::{config::AppConfig, logging, AppError};
use db::pg::{run_migrations, PgDatabase};
use db::Repositories;
use tokio::signal;
use tracing::{info, warn};

const MIGRATION_RETRY: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    logging::init_tracing(
        "webhook-api",
        &config.observability.log_level,
        config.observability.otlp_endpoint.as_deref(),
    )?;

    let database = match PgDatabase::connect(&config.database).await {
        Ok(database) => database,
        Err(err) => {
            // Keep acknowledging deliveries while the store is down; health
            // reports it and writes are dropped until it comes back.
            warn!(error = %err, "database unavailable at startup; serving with a lazy pool");
            let database = PgDatabase::connect_lazy(&config.database).map_err(AppError::db)?;
            tokio::spawn(migrate_when_reachable(database.clone()));
            database
        }
    };
    let repositories: Arc<dyn Repositories> = Arc::new(database);
    let state = Arc::new(ApiState::new(
        repositories,
        &config.webhook,
        config.observability.metrics_path.clone(),
    ));
    let app: Router = build_router(state);

    let addr: std::net::SocketAddr = config.api.bind.parse()?;
    info!("api listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    logging::shutdown_tracer_provider();
    Ok(())
}

async fn migrate_when_reachable(database: PgDatabase) {
    loop {
        match run_migrations(database.pool()).await {
            Ok(()) => {
                info!("database reachable; migrations applied");
                return;
            }
            Err(err) => {
                warn!(error = %err, retry_secs = MIGRATION_RETRY.as_secs(), "migrations pending");
                tokio::time::sleep(MIGRATION_RETRY).await;
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
