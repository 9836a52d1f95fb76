//! Product repository for document store operations.

use dyf_core::ProductId;

use super::{DocumentStore, PRODUCTS, RepositoryError, decode};
use crate::models::{Product, ProductPatch};

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Add a product under its own id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is already used.
    pub async fn add(&self, product: &Product) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(product)?;
        self.store.insert(PRODUCTS, product.id.as_str(), &data).await
    }

    /// Partially update a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(&self, id: &ProductId, patch: &ProductPatch) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(patch)?;
        self.store.update(PRODUCTS, id.as_str(), &data).await
    }

    /// Delete a product. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        self.store.delete(PRODUCTS, id.as_str()).await
    }

    /// Whether a product with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        self.store.exists(PRODUCTS, id.as_str()).await
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        self.store
            .get(PRODUCTS, id.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    /// Every product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored document is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.store
            .list(PRODUCTS)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dyf_core::Price;

    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            category: "Herramientas".to_string(),
            description: "Taladro percutor".to_string(),
            brand: "Bosch".to_string(),
            price: Price::from_pesos(49_990),
            thumbnail_url: "/static/img/taladro.jpg".to_string(),
            title: "Taladro".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_get_list() {
        let store = DocumentStore::memory();
        let products = ProductRepository::new(&store);
        products.add(&product("p1")).await.unwrap();
        products.add(&product("p2")).await.unwrap();

        let p1 = ProductId::parse("p1").unwrap();
        assert_eq!(products.get(&p1).await.unwrap(), Some(product("p1")));
        assert!(products.exists(&p1).await.unwrap());

        let ids: Vec<String> = products
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let store = DocumentStore::memory();
        let products = ProductRepository::new(&store);
        products.add(&product("p1")).await.unwrap();
        assert!(matches!(
            products.add(&product("p1")).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update_and_delete() {
        let store = DocumentStore::memory();
        let products = ProductRepository::new(&store);
        let id = ProductId::parse("p1").unwrap();
        products.add(&product("p1")).await.unwrap();

        let patch = ProductPatch {
            price: Some(Price::from_pesos(39_990)),
            ..ProductPatch::default()
        };
        products.update(&id, &patch).await.unwrap();

        let updated = products.get(&id).await.unwrap().unwrap();
        assert_eq!(updated.price, Price::from_pesos(39_990));
        assert_eq!(updated.title, "Taladro");

        assert!(products.delete(&id).await.unwrap());
        assert!(products.get(&id).await.unwrap().is_none());
        assert!(matches!(
            products.update(&id, &patch).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
