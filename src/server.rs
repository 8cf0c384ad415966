//! Web server entry point.

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use equalify::config::EqualifyConfig;
use equalify::db;
use equalify::web::{self, AppState};

/// Open the store and serve the web UI until Ctrl-C.
pub async fn serve(config: EqualifyConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(conn, config);
    let router = web::router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "Equalify listening at http://{bind_addr}/");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down web server");
        })
        .await?;

    Ok(())
}
