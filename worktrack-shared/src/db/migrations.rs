//! Embedded database migration runner.
//!
//! Migrations are plain SQL files in `migrations/` at the workspace root,
//! compiled into the binary with `sqlx::migrate!` and applied at startup.
//! Each file is applied once; sqlx tracks state in `_sqlx_migrations`.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations against the given pool.
///
/// Safe to call on every startup: already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
