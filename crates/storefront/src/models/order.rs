//! Orders ("pedidos").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dyf_core::{CartEntry, Email, OrderId, OrderStatus, Price, ProductId};

/// One product line of an order, priced at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Price,
    pub quantity: u32,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

impl From<&CartEntry> for OrderLine {
    fn from(entry: &CartEntry) -> Self {
        Self {
            product_id: entry.product.id.clone(),
            title: entry.product.title.clone(),
            unit_price: entry.product.price,
            quantity: entry.quantity,
        }
    }
}

/// An order, stored in the `orders` collection under its `id`.
///
/// `email` ties the order to the customer; the orders page lists only the
/// documents whose `email` matches the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub email: Email,
    pub customer_name: String,
    pub lines: Vec<OrderLine>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Number of units across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Creation date for display, e.g. `18-10-2026 14:05`.
    #[must_use]
    pub fn created_at_display(&self) -> String {
        self.created_at.format("%d-%m-%Y %H:%M").to_string()
    }
}
