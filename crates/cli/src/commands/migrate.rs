//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and create the
//! `store.document` table, its indexes and the `tower_sessions` schema.

use thiserror::Error;

use super::ConnectError;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run every pending migration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = super::connect().await?;

    tracing::info!("Running store migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Store migrations complete!");
    Ok(())
}
