//! Persistence for the Folio store.
//!
//! ## Tables
//!
//! - `customers` - Customer profiles synced from the identity provider
//! - `customer_addresses` - Address books (soft-deleted via `is_active`)
//! - `books` - The catalog
//! - `reference_data` - Shared lookup values (type, condition, genre, publisher)
//! - `offers` - Customer resale offers awaiting moderation
//! - `orders` / `order_items` - Orders with price-snapshot line items
//! - `shopping_carts` / `shopping_cart_items` - Anonymous carts keyed by correlation ID
//!
//! # Migrations
//!
//! Migrations are stored in `crates/domain/migrations/` and run via:
//! ```bash
//! cargo run -p folio-cli -- migrate
//! ```
//!
//! # Backends
//!
//! [`repositories`] defines the traits; [`postgres`] implements them on a
//! connection pool and [`memory`] on a mutex-guarded in-process store. The
//! two answer every query identically, so tests and demos can run without
//! a database.

pub mod memory;
pub mod postgres;
pub mod repositories;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::{
    PgAddressRepository, PgBookRepository, PgCustomerRepository, PgOfferRepository,
    PgOrderRepository, PgReferenceDataRepository, PgShoppingCartRepository,
};
pub use repositories::{
    AddressRepository, BookRepository, CustomerRepository, OfferRepository, OrderRepository,
    ReferenceDataRepository, ShoppingCartRepository,
};

/// Embedded migrations, applied by the CLI `migrate` command.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Write lost to a concurrent update, or a constraint violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Operation exceeded its time limit.
    #[error("operation timed out")]
    Timeout,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
