//! Order service: checkout and order management.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use dyf_core::{Cart, Email, OrderId, OrderStatus};

use crate::db::{DocumentStore, OrderRepository, RepositoryError};
use crate::models::{CurrentUser, Order, OrderLine};

/// Order errors.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("order not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a DocumentStore) -> Self {
        Self {
            orders: OrderRepository::new(store),
        }
    }

    /// Turn the cart into a pending order for `user`.
    ///
    /// The caller clears the session cart once this succeeds.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` if there is nothing to order.
    #[instrument(skip(self, user, cart), fields(user_id = %user.id))]
    pub async fn checkout(&self, user: &CurrentUser, cart: &Cart) -> Result<Order, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let order = Order {
            id: OrderId::generate(),
            email: user.email.clone(),
            customer_name: user.name.clone(),
            lines: cart.entries().iter().map(OrderLine::from).collect(),
            total: cart.total(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.orders.create(&order).await?;

        tracing::info!(order_id = %order.id, total = %order.total, "Order placed");
        Ok(order)
    }

    /// Orders placed by this customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn orders_for(&self, email: &Email) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_by_email(email).await?)
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_all().await?)
    }

    /// Change the status of an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<(), OrderError> {
        self.orders
            .update_status(id, status)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OrderError::NotFound,
                other => OrderError::Repository(other),
            })?;
        tracing::info!("Order status changed");
        Ok(())
    }
}
