//! DyF Core - Shared domain types and rules.
//!
//! This crate provides the types and pure logic used by the DyF store:
//! - `storefront` - Public catalog, cart, accounts and the sales view
//! - `cli` - Command-line tools for migrations, admin users and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and rules - no I/O, no database access,
//! no HTTP. Form validation and cart arithmetic live here so they can be
//! tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, RUTs, prices, roles and statuses
//! - [`validation`] - Form field rules (required, email, RUT, password strength)
//! - [`cart`] - Shopping cart state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartEntry, CartProduct};
pub use types::*;
pub use validation::{FieldErrors, PasswordPolicy};
