use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, bail};
use cinebook::config::{Config, Environment};
use cinebook::readiness::{self, ReadinessState};
use cinebook::{AppState, db, revision, telemetry};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use migration::{MigrationStatus, Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tracing::{error, info};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "cinebook", version, about = "CineBook API server and operator tooling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wait for the database, then serve HTTP (default).
    Serve,
    /// Generate a revision from the difference between entities and database.
    Revision {
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Apply every pending revision.
    Upgrade,
    /// Roll back the most recent revisions.
    Downgrade {
        #[arg(short = 'n', long, default_value_t = 1)]
        steps: u32,
    },
    /// Show applied and pending revisions.
    Status,
    /// Probe the local API's health endpoint; exit 0 on 200.
    Healthcheck {
        #[arg(long, env = "HEALTHCHECK_URL", default_value = "http://127.0.0.1:8000/")]
        url: Url,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage errors exit 1, help/version exit 0.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            telemetry::init_tracing(Environment::default());
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init_tracing(config.environment);

    match run(cli.command.unwrap_or(Command::Serve), config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = ?err, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    match command {
        Command::Serve => serve(config).await,
        Command::Revision { message } => {
            let db = ready_database(&config).await?;
            generate_revision(&db, &config.migration_dir, message.as_deref()).await
        }
        Command::Upgrade => {
            let db = ready_database(&config).await?;
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            Migrator::up(&db, None)
                .await
                .context("failed to apply revisions")?;
            info!(applied = pending, "database is at head");
            Ok(())
        }
        Command::Downgrade { steps } => {
            let db = ready_database(&config).await?;
            Migrator::down(&db, Some(steps))
                .await
                .context("failed to roll back revisions")?;
            info!(steps, "rolled back revisions");
            Ok(())
        }
        Command::Status => {
            let db = ready_database(&config).await?;
            print_status(&db).await
        }
        Command::Healthcheck { url } => healthcheck(url).await,
    }
}

async fn ready_database(config: &Config) -> anyhow::Result<DatabaseConnection> {
    let db = db::connect(&config.database).await?;
    match readiness::wait_until_ready(&db, &config.readiness).await {
        ReadinessState::Healthy => Ok(db),
        state => bail!(
            "database is {state:?} after {} attempts",
            config.readiness.retries
        ),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let metrics = telemetry::install_metrics()?;
    let db = ready_database(&config).await?;

    let state = AppState::new(db, metrics, config.auth_rate_limit_per_second);
    let app = cinebook::router(state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shut down");
    Ok(())
}

async fn generate_revision(
    db: &DatabaseConnection,
    migration_dir: &Path,
    message: Option<&str>,
) -> anyhow::Result<()> {
    let revision = revision::generate(db, migration_dir, message).await?;
    println!("Generated {} ({})", revision.path.display(), revision.message);
    for change in &revision.changes {
        println!("  {}", change.description);
    }
    Ok(())
}

async fn print_status(db: &DatabaseConnection) -> anyhow::Result<()> {
    let migrations = Migrator::get_migration_with_status(db).await?;
    let mut current = None;
    for migration in &migrations {
        let status = match migration.status() {
            MigrationStatus::Applied => {
                current = Some(migration.name());
                "applied"
            }
            MigrationStatus::Pending => "pending",
        };
        println!("{status:<8} {}", migration.name());
    }
    println!("current: {}", current.unwrap_or("<base>"));
    Ok(())
}

async fn healthcheck(url: Url) -> anyhow::Result<()> {
    let response = reqwest::get(url.clone())
        .await
        .with_context(|| format!("GET {url} failed"))?;
    if response.status() != reqwest::StatusCode::OK {
        bail!("GET {url} returned {}", response.status());
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
