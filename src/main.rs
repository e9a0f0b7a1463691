use std::sync::Arc;

use bookclub::config::{Cli, Config, default_config_dir, default_config_path};
use bookclub::db::Database;
use bookclub::handler::AppState;
use bookclub::library::Library;
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // With --config the file's directory also holds the database file,
    // otherwise ~/.bookclub/ is used for both.
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    let env_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!(env_file = env_loaded, "bookclub.svc starting");

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });
    tracing::info!(
        database = %cfg.database.name,
        mode = cfg.database.mode(),
        user = %cfg.database.user,
        "database config"
    );

    let db = Arc::new(Database::new(&cfg.database, &data_dir).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup database");
        std::process::exit(1);
    }));
    tracing::info!("database connection successful");

    let info = Library::new(&db).info().await;
    if info.version.is_empty() {
        tracing::error!("failed to query database version");
        std::process::exit(1);
    }
    tracing::info!(version = %info.version, "sqlite version");

    match db.probe_write().await {
        Ok(()) => tracing::info!("wrote test data to database"),
        Err(e) => tracing::warn!(error = %bookclub::unpack_error(&e), "failed to write test data"),
    }

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let cancellation_token = CancellationToken::new();

    let app = bookclub::app(AppState { db });

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    let shutdown_token = cancellation_token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl+c signal received, preparing to shutdown");
            shutdown_token.cancel();
        }
    });

    tracing::info!("bookclub.svc running on {}", &address);
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(cancellation_token.cancelled_owned())
        .await
    {
        tracing::error!(error = %err, "server failed");
        std::process::exit(1);
    }

    tracing::info!("bookclub.svc going off, graceful shutdown complete");
}
