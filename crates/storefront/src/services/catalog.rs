//! Product catalog service.
//!
//! Reads go through a `moka` cache shared in `AppState`. Every write
//! invalidates it.

use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use dyf_core::validation::{FieldError, required, validate_price, validate_product_id};
use dyf_core::{FieldErrors, ProductId};

use crate::db::{DocumentStore, ProductRepository, RepositoryError};
use crate::models::{Product, ProductPatch};

/// Cache key for catalog reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Products,
    Product(ProductId),
}

/// Cached catalog data.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
}

/// Shared catalog cache.
pub type CatalogCache = Cache<CacheKey, CacheValue>;

/// Build the catalog cache with the given time-to-live.
#[must_use]
pub fn new_catalog_cache(ttl: Duration) -> CatalogCache {
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(ttl)
        .build()
}

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("product id already exists")]
    IdExists,

    #[error("product not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CatalogError {
    /// The message shown above the product form.
    #[must_use]
    pub const fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::IdExists => Some("El ID del producto ya existe. Por favor, elija otro ID."),
            _ => None,
        }
    }
}

/// Admin product form. On update the `id` field is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub id: String,
    pub category: String,
    pub description: String,
    pub brand: String,
    pub price: String,
    pub thumbnail_url: String,
    pub title: String,
}

impl ProductForm {
    /// Prefill the form from a stored product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            category: product.category.clone(),
            description: product.description.clone(),
            brand: product.brand.clone(),
            price: product.price.amount().to_string(),
            thumbnail_url: product.thumbnail_url.clone(),
            title: product.title.clone(),
        }
    }

    /// Validate every field and build a product under `id`.
    fn validate(&self, id: Result<ProductId, FieldError>) -> Result<Product, FieldErrors> {
        let mut errors = FieldErrors::new();
        let id = errors.check("id", id);
        let category = errors.check("category", required(&self.category));
        let description = errors.check("description", required(&self.description));
        let brand = errors.check("brand", required(&self.brand));
        let price = errors.check("price", validate_price(&self.price));
        let thumbnail_url = errors.check("thumbnail_url", required(&self.thumbnail_url));
        let title = errors.check("title", required(&self.title));

        match (id, category, description, brand, price, thumbnail_url, title) {
            (
                Some(id),
                Some(category),
                Some(description),
                Some(brand),
                Some(price),
                Some(thumbnail_url),
                Some(title),
            ) => Ok(Product {
                id,
                category: category.to_owned(),
                description: description.to_owned(),
                brand: brand.to_owned(),
                price,
                thumbnail_url: thumbnail_url.to_owned(),
                title: title.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

/// Catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    cache: &'a CatalogCache,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a DocumentStore, cache: &'a CatalogCache) -> Self {
        Self {
            products: ProductRepository::new(store),
            cache,
        }
    }

    /// Every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await {
            tracing::debug!("Cache hit for product list");
            return Ok(products);
        }

        let products = self.products.list().await?;
        self.cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if there is no such product.
    pub async fn get(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            return Ok(*product);
        }

        let product = self.products.get(id).await?.ok_or(CatalogError::NotFound)?;
        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Add a product from the admin form.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for invalid fields and
    /// `CatalogError::IdExists` if the id is taken.
    #[instrument(skip(self, form), fields(product_id = %form.id.trim()))]
    pub async fn add(&self, form: &ProductForm) -> Result<Product, CatalogError> {
        let product = form
            .validate(validate_product_id(&form.id))
            .map_err(CatalogError::Validation)?;

        if self.products.exists(&product.id).await? {
            return Err(CatalogError::IdExists);
        }

        self.products.add(&product).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CatalogError::IdExists,
            other => CatalogError::Repository(other),
        })?;
        self.invalidate(&product.id).await;

        tracing::info!("Product added");
        Ok(product)
    }

    /// Replace every editable field of an existing product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for invalid fields and
    /// `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self, form), fields(product_id = %id))]
    pub async fn update(&self, id: &ProductId, form: &ProductForm) -> Result<Product, CatalogError> {
        let product = form
            .validate(Ok(id.clone()))
            .map_err(CatalogError::Validation)?;

        self.products
            .update(id, &ProductPatch::from(product.clone()))
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::NotFound,
                other => CatalogError::Repository(other),
            })?;
        self.invalidate(id).await;

        tracing::info!("Product updated");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        if !self.products.delete(id).await? {
            return Err(CatalogError::NotFound);
        }
        self.invalidate(id).await;

        tracing::info!("Product deleted");
        Ok(())
    }

    async fn invalidate(&self, id: &ProductId) {
        self.cache.invalidate(&CacheKey::Products).await;
        self.cache.invalidate(&CacheKey::Product(id.clone())).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dyf_core::Price;

    use super::*;

    fn form(id: &str) -> ProductForm {
        ProductForm {
            id: id.to_string(),
            category: "Herramientas".to_string(),
            description: "Taladro percutor 750W".to_string(),
            brand: "Bosch".to_string(),
            price: "49990".to_string(),
            thumbnail_url: "/static/img/taladro.jpg".to_string(),
            title: "Taladro".to_string(),
        }
    }

    fn cache() -> CatalogCache {
        new_catalog_cache(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let store = DocumentStore::memory();
        let cache = cache();
        let catalog = CatalogService::new(&store, &cache);

        assert!(catalog.list().await.unwrap().is_empty());
        let added = catalog.add(&form("taladro-1")).await.unwrap();
        assert_eq!(added.price, Price::from_pesos(49_990));

        // The add invalidated the cached empty list.
        let listed = catalog.list().await.unwrap();
        assert_eq!(listed, vec![added.clone()]);
        assert_eq!(catalog.get(&added.id).await.unwrap(), added);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = DocumentStore::memory();
        let cache = cache();
        let catalog = CatalogService::new(&store, &cache);
        catalog.add(&form("taladro-1")).await.unwrap();

        let err = catalog.add(&form("taladro-1")).await.unwrap_err();
        assert!(matches!(err, CatalogError::IdExists));
        assert_eq!(
            err.user_message(),
            Some("El ID del producto ya existe. Por favor, elija otro ID.")
        );
    }

    #[tokio::test]
    async fn test_invalid_form() {
        let store = DocumentStore::memory();
        let cache = cache();
        let catalog = CatalogService::new(&store, &cache);
        let mut bad = form("taladro 1");
        bad.price = "-5".to_string();
        bad.title = "  ".to_string();

        let Err(CatalogError::Validation(errors)) = catalog.add(&bad).await else {
            panic!("expected validation error");
        };
        assert!(errors.contains("id"));
        assert_eq!(errors.first("price"), Some("El precio no puede ser negativo"));
        assert_eq!(errors.first("title"), Some("Este campo es obligatorio"));
        assert!(!errors.contains("brand"));
    }

    #[tokio::test]
    async fn test_update_refreshes_cache() {
        let store = DocumentStore::memory();
        let cache = cache();
        let catalog = CatalogService::new(&store, &cache);
        let added = catalog.add(&form("taladro-1")).await.unwrap();
        catalog.get(&added.id).await.unwrap();

        let mut edit = form("ignored");
        edit.price = "39990".to_string();
        catalog.update(&added.id, &edit).await.unwrap();

        let fetched = catalog.get(&added.id).await.unwrap();
        assert_eq!(fetched.price, Price::from_pesos(39_990));
        assert_eq!(fetched.id, added.id);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = DocumentStore::memory();
        let cache = cache();
        let catalog = CatalogService::new(&store, &cache);
        let added = catalog.add(&form("taladro-1")).await.unwrap();
        catalog.list().await.unwrap();

        catalog.delete(&added.id).await.unwrap();
        assert!(catalog.list().await.unwrap().is_empty());
        assert!(matches!(
            catalog.get(&added.id).await,
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(
            catalog.delete(&added.id).await,
            Err(CatalogError::NotFound)
        ));
    }
}
