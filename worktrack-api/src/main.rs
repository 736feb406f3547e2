//! # WorkTrack API Server
//!
//! JSON/HTTP backend for tracking users, projects and tasks, with stateless
//! JWT bearer authentication in front of every resource endpoint.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/worktrack \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p worktrack-api
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use worktrack_api::{
    app::{build_router, AppState},
    config::Config,
};
use worktrack_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, PoolSettings},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worktrack_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "WorkTrack API server v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    // Fail fast: an unreachable database should abort startup, not produce
    // a server that 500s on every request
    let pool = create_pool(PoolSettings {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let bind_addr = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    } else {
        tracing::info!("Shutdown signal received");
    }
}
