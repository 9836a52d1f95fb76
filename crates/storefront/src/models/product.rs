//! Catalog products.

use serde::{Deserialize, Serialize};

use dyf_core::{CartProduct, Price, ProductId};

/// A catalog product, stored in the `products` collection under its `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category: String,
    pub description: String,
    pub brand: String,
    pub price: Price,
    pub thumbnail_url: String,
    pub title: String,
}

impl Product {
    /// The snapshot kept in a cart entry.
    #[must_use]
    pub fn to_cart_product(&self) -> CartProduct {
        CartProduct {
            id: self.id.clone(),
            title: self.title.clone(),
            price: self.price,
            thumbnail_url: self.thumbnail_url.clone(),
        }
    }
}

/// Partial update of a product. The id cannot change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl From<Product> for ProductPatch {
    fn from(product: Product) -> Self {
        Self {
            category: Some(product.category),
            description: Some(product.description),
            brand: Some(product.brand),
            price: Some(product.price),
            thumbnail_url: Some(product.thumbnail_url),
            title: Some(product.title),
        }
    }
}
