//! # Cartes Server
//!
//! Serves the card catalog and its user accounts over HTTP.
//!
//! ```text
//! cartes-server                 # serve
//! cartes-server db migrate      # apply embedded migrations and exit
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use cartes_config::{Config, ConfigLoad, ConfigLoader};
use cartes_core::{
    MIGRATOR,
    database::{
        self, PoolSettings, PostgresCatalogRepository, PostgresCredentialStore,
    },
};
use cartes_server::{AppState, build_authenticator, create_app};
use clap::{Args as ClapArgs, Parser, Subcommand};
use sqlx::PgPool;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "cartes-server")]
#[command(about = "Trading card catalog service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "CARTES_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let config = load_runtime_config(&cli.serve)?;

    if let Some(Command::Db(DbCommand::Migrate)) = cli.command {
        let pool = connect_pool(&config).await?;
        run_migrations(&pool).await?;
        return Ok(());
    }

    run_server(config).await
}

/// Must run before configuration is loaded. Filtering follows `RUST_LOG`
/// from the process environment, not from `.env`.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file in use");
    }
    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => {
                warn!(
                    message = %warning.message,
                    hint = %hint,
                    "configuration warning"
                )
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    info!(
        database = ?config.database,
        catalog.default_page_size = config.catalog.default_page_size,
        catalog.max_page_size = config.catalog.max_page_size,
        auth.token_ttl = ?config.auth.token_ttl,
        dev_mode = config.dev_mode,
        "configuration in effect"
    );

    Ok(Arc::new(config))
}

async fn connect_pool(config: &Config) -> anyhow::Result<PgPool> {
    let settings = PoolSettings {
        max_connections: config.database.max_connections,
        acquire_timeout: config.database.acquire_timeout,
    };
    database::connect(&config.database.url, settings)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let pool = connect_pool(&config).await?;
    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let catalog = Arc::new(PostgresCatalogRepository::new(pool.clone()));
    let credentials = Arc::new(PostgresCredentialStore::new(pool.clone()));
    let authenticator =
        build_authenticator(&config.auth, credentials.clone())?;

    let state = AppState::new(
        Arc::clone(&config),
        catalog,
        credentials,
        Arc::new(authenticator),
    );
    let router = create_app(state);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Starting card catalog server on {}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
