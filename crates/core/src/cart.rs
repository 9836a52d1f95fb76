//! Shopping cart state.
//!
//! The cart lives in the visitor's session and is loaded, mutated and written
//! back as a single value on every change. Entries hold a snapshot of the
//! product as it was when added, so the cart still renders if the catalog
//! entry is later edited or removed.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Product fields the cart needs to render a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub thumbnail_url: String,
}

/// A product and how many of it are in the cart. `quantity` is always >= 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartEntry {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Ordered list of cart entries, at most one per product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`.
    ///
    /// If the product is already in the cart its quantity goes up by one;
    /// otherwise a new entry with quantity 1 is appended.
    pub fn add(&mut self, product: CartProduct) {
        if let Some(entry) = self.entry_mut(&product.id) {
            entry.quantity = entry.quantity.saturating_add(1);
        } else {
            self.entries.push(CartEntry {
                product,
                quantity: 1,
            });
        }
    }

    /// Increase the quantity of `id` by one. Unknown ids are ignored.
    pub fn increment(&mut self, id: &ProductId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.quantity = entry.quantity.saturating_add(1);
        }
    }

    /// Decrease the quantity of `id` by one, removing the entry at zero.
    /// Unknown ids are ignored.
    pub fn decrement(&mut self, id: &ProductId) {
        let Some(pos) = self.position(id) else {
            return;
        };
        let emptied = self.entries.get_mut(pos).is_some_and(|entry| {
            entry.quantity = entry.quantity.saturating_sub(1);
            entry.quantity == 0
        });
        if emptied {
            self.entries.remove(pos);
        }
    }

    /// Remove the entry for `id` whatever its quantity.
    pub fn remove(&mut self, id: &ProductId) {
        self.entries.retain(|entry| &entry.product.id != id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sum of price times quantity over all entries.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Total number of units across entries.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |acc, entry| acc.saturating_add(entry.quantity))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Quantity of `id` in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.entries
            .iter()
            .find(|entry| &entry.product.id == id)
            .map_or(0, |entry| entry.quantity)
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.product.id == id)
    }

    fn entry_mut(&mut self, id: &ProductId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|entry| &entry.product.id == id)
    }
}
