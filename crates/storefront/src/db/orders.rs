//! Order repository for document store operations.

use serde_json::json;

use dyf_core::{Email, OrderId, OrderStatus};

use super::{DocumentStore, Filter, ORDERS, RepositoryError, decode};
use crate::models::Order;

/// Repository for orders.
pub struct OrderRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Store a new order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order id already exists.
    pub async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(order)?;
        self.store
            .insert(ORDERS, &order.id.to_string(), &data)
            .await
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.store
            .get(ORDERS, &id.to_string())
            .await?
            .map(decode)
            .transpose()
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored document is invalid.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = self
            .store
            .list(ORDERS)
            .await?
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<Order>, _>>()?;
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    /// Orders placed with this email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored document is invalid.
    pub async fn list_by_email(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = self
            .store
            .find(ORDERS, &Filter::eq("email", email.as_str()))
            .await?
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<Order>, _>>()?;
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    /// Set the status of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        self.store
            .update(ORDERS, &id.to_string(), &json!({ "status": status }))
            .await
    }
}

fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
