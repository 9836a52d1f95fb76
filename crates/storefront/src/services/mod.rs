//! Business logic services for the storefront.
//!
//! - `auth` - Registration, login, password change requests, profile edits
//! - `catalog` - Product catalog with a read cache
//! - `orders` - Checkout and order status management

pub mod auth;
pub mod catalog;
pub mod orders;
