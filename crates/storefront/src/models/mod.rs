//! Domain models for the store.
//!
//! Models are what the repositories read from and write to the document
//! store. Session-side types (the logged-in user, flash messages) live in
//! [`session`].

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{Order, OrderLine};
pub use product::{Product, ProductPatch};
pub use session::{CurrentUser, Flash, FlashKind, session_keys};
pub use user::{User, UserPatch};
