//! `chirpd` — the Chirp server binary.
//!
//! Usage:
//!   chirpd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/chirp/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use chirp_core::Module;
use config::ServerConfig;

/// Chirp server.
#[derive(Parser, Debug)]
#[command(name = "chirpd", about = "Chirp server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    let listen = cli.listen.unwrap_or(server_config.server.listen);

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = chirp_core::ServiceConfig {
        data_dir: Some(data_dir.clone()),
        listen: listen.clone(),
        ..Default::default()
    };

    // Initialize embedded stores (shared by all modules).
    let sql: Arc<dyn chirp_sql::SQLStore> = Arc::new(
        chirp_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let blob: Arc<dyn chirp_blob::BlobStore> = Arc::new(
        chirp_blob::FileStore::open(&core_config.resolve_blob_dir())
            .map_err(|e| anyhow::anyhow!("failed to open blob store: {}", e))?,
    );

    // Initialize modules. Timeline borrows the identity service so it can
    // validate user references and resolve author names.
    let identity_module = identity::IdentityModule::new(Arc::clone(&sql))?;
    info!("Identity module initialized");

    let timeline_module = timeline::TimelineModule::new(
        Arc::clone(&sql),
        Arc::clone(&blob),
        Arc::clone(identity_module.service()),
    )?;
    info!("Timeline module initialized");

    let identity_service = Arc::clone(identity_module.service());

    let module_routes = vec![
        (identity_module.name(), identity_module.routes()),
        (timeline_module.name(), timeline_module.routes()),
    ];

    // Build router.
    let app = routes::build_router(identity_service, module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("Chirp server listening on {}", listen);
    axum::serve(listener, app).await?;

    Ok(())
}
