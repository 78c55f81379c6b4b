//! FURIA KYF server binary.
//!
//! Loads `.env`, connects to PostgreSQL, applies migrations and serves the
//! API plus the public directory until interrupted.

use std::path::PathBuf;

use clap::Parser;
use kyf_api::config::ApiConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// CLI arguments. Anything not given here falls back to `ApiConfig::from_env`.
#[derive(Parser, Debug)]
#[command(name = "kyf_server", about = "FURIA Know Your Fan server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    bind: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/kyf"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Directory served as static files; uploads land in `<dir>/uploads`.
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    public_dir: PathBuf,

    /// Public base URL used in confirmation links.
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,kyf_api=debug,kyf_core=debug")
                }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    config.bind_addr = args.bind;
    config.pg_connection_url = args.database_url;
    config.public_dir = args.public_dir;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    info!(
        bind = %config.bind_addr,
        public_dir = %config.public_dir.display(),
        max_connections = args.max_connections,
        "starting kyf_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.pg_connection_url)
        .await?;

    info!("running database migrations");
    kyf_api::migrate(&pool).await?;

    let bind_addr = config.bind_addr.clone();
    let state = kyf_api::AppState::new(pool, config)?;
    let app = kyf_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
