//! Seed the product catalog from a JSON file.
//!
//! The file holds an array of products:
//!
//! ```json
//! [
//!   {
//!     "id": "taladro-750",
//!     "category": "Herramientas eléctricas",
//!     "description": "Taladro percutor 750W",
//!     "brand": "Bosch",
//!     "price": 49990,
//!     "thumbnail_url": "https://example.com/taladro.jpg",
//!     "title": "Taladro percutor"
//!   }
//! ]
//! ```
//!
//! Products whose id already exists are left untouched.

use std::path::Path;

use tracing::{info, warn};

use dyf_storefront::db::{DocumentStore, ProductRepository};
use dyf_storefront::models::Product;

/// Insert every product in `file_path` that is not already in the store.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, or a database
/// operation fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let products: Vec<Product> = serde_json::from_str(&content)?;
    info!(count = products.len(), "Parsed products");

    let pool = super::connect().await?;
    let store = DocumentStore::Postgres(pool);
    let repo = ProductRepository::new(&store);

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for product in &products {
        if repo.exists(&product.id).await? {
            warn!(product_id = %product.id, "Product already exists, skipping");
            skipped += 1;
            continue;
        }
        repo.add(product).await?;
        inserted += 1;
    }

    info!(inserted, skipped, "Seeding complete");
    Ok(())
}
