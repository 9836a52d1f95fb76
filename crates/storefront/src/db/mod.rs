//! Document storage for the store.
//!
//! # Collections
//!
//! - `users` - Customer and admin accounts (unique `email` and `rut`)
//! - `products` - Catalog, keyed by the admin-chosen product id
//! - `orders` - Orders placed from the cart
//!
//! Every collection is a set of JSON documents addressed by
//! `(collection, id)`. In production they live in the `store.document`
//! table; without a database URL an in-memory map is used instead.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p dyf-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod products;
pub mod store;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryStore;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use store::{Document, DocumentStore, Filter};
pub use users::UserRepository;

/// Collection holding user accounts.
pub const USERS: &str = "users";
/// Collection holding the product catalog.
pub const PRODUCTS: &str = "products";
/// Collection holding orders.
pub const ORDERS: &str = "orders";

/// Fields that must be unique within a collection.
///
/// Postgres enforces these with unique expression indexes; the memory store
/// checks them on every write.
pub const UNIQUE_FIELDS: &[(&str, &str)] = &[(USERS, "email"), (USERS, "rut")];

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A model could not be converted to a document.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate id or unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
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

/// Deserialize a stored document into a model.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    document: Document,
) -> Result<T, RepositoryError> {
    serde_json::from_value(document.data).map_err(|e| {
        RepositoryError::DataCorruption(format!(
            "invalid document {}/{}: {e}",
            document.collection, document.id
        ))
    })
}
