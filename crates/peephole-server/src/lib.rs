//! peephole-server: HTTP front end for the peephole channel.
//!
//! Ties the post store and the channel selector together behind an Axum
//! router:
//!
//! - `/raw/peephole` shows whatever is on air, wrapped in a blank page
//! - `/raw/peephole.json` and `/api/programme` expose the same data as JSON
//! - graceful shutdown on SIGINT or SIGTERM

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use peephole_core::config::Config;
use peephole_db::pool::DbPool;

use crate::context::AppContext;

/// Start the peephole server.
///
/// Opens (or creates) the post database, builds the [`AppContext`] and serves
/// the router until a shutdown signal arrives.
pub async fn start(config: Config) -> peephole_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db = open_db(&config)?;

    let host = config.server.host.as_str();
    let port = config.server.port;
    let app = router::build_router(AppContext::new(db, &config));

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .map_err(|e| {
            peephole_core::Error::Internal(format!("Failed to bind to {host}:{port}: {e}"))
        })?;
    let addr = listener.local_addr()?;
    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Open (or create) the post database named by `config.server.db_path`,
/// creating its parent directory when needed.
pub fn open_db(config: &Config) -> peephole_core::Result<DbPool> {
    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db_str = db_path.to_string_lossy();
    let db = peephole_db::pool::init_pool(&db_str)?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    Ok(db)
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
