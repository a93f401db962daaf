//! realty-auth server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http::server ──▶ http::handlers ──▶ auth::service
//!                  (layers)                            │
//!                                                      ├─▶ lockout::guard  (policy, pure)
//!                                                      ├─▶ auth::password  (argon2)
//!                                                      ├─▶ auth::token     (HS256 JWT)
//!                                                      └─▶ accounts::store (DashMap + snapshot)
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use realty_auth::accounts::{AccountStore, MemoryAccountStore};
use realty_auth::auth::{AuthService, TokenIssuer};
use realty_auth::config::{load_or_default, schema::DEFAULT_JWT_SECRET};
use realty_auth::http::HttpServer;
use realty_auth::lifecycle::{wait_for_signal, Shutdown};
use realty_auth::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "realty-auth")]
#[command(about = "Account and login service for the listing backend", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "realty-auth.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_or_default(Some(args.config.as_path()))?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("realty-auth v{} starting", env!("CARGO_PKG_VERSION"));

    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        tracing::warn!("Using the built-in JWT secret; set JWT_SECRET_KEY in production");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        token_ttl_days = config.auth.token_ttl_days,
        snapshot = ?config.store.snapshot_path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = match &config.store.snapshot_path {
        Some(path) => MemoryAccountStore::load_from_file(&PathBuf::from(path))?,
        None => MemoryAccountStore::new(None),
    };
    let store: Arc<dyn AccountStore> = Arc::new(store);

    let auth = AuthService::new(store.clone(), TokenIssuer::from_config(&config.auth));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(config, auth);
    server.run(listener, shutdown.subscribe()).await?;

    if let Err(e) = store.flush().await {
        tracing::error!(error = %e, "Failed to write account snapshot");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
