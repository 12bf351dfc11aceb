//! Database migration command.
//!
//! Applies the migrations embedded in `folio-domain` to the database named
//! by `DATABASE_URL`. Already-applied versions are skipped, so the command
//! is safe to re-run.

use secrecy::SecretString;
use thiserror::Error;
use tracing::info;

use folio_domain::db;

/// Errors that can occur during migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Run bookstore database migrations.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset, the database cannot be
/// reached, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("DATABASE_URL"))?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}
