//! Schema migrations embedded from the workspace `migrations/` directory.

use sqlx::PgPool;
use tracing::info;

use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;

/// Apply every pending migration.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let migrator = sqlx::migrate!("../../migrations");
    info!(
        available = migrator.iter().count(),
        "Applying registry schema migrations"
    );

    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to apply migrations: {e}"),
            e,
        )
    })?;

    info!("Registry schema is up to date");
    Ok(())
}
