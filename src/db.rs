use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::{self, DatabaseConfig};

/// Builds the connection pool without dialing the database; the readiness
/// gate is what waits for it to accept connections.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let url = config
        .connection_url()
        .context("failed to resolve database connection settings")?;
    info!(url = %config::redact(&url), "connecting to database");

    let mut options = ConnectOptions::new(String::from(url));
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(5))
        .connect_lazy(true)
        .sqlx_logging(false);

    Database::connect(options)
        .await
        .context("failed to create database pool")
}
