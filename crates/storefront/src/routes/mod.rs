//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Catalog, cart and (admin) product form
//!
//! # Cart
//! POST /cart/add                - Add one unit of a product
//! POST /cart/increment          - Increment a line
//! POST /cart/decrement          - Decrement a line (removed at 0)
//! POST /cart/remove             - Remove a line
//! POST /cart/clear              - Empty the cart
//! POST /cart/checkout           - Place an order (requires auth)
//!
//! # Products
//! GET  /products/{id}           - Product detail
//! POST /products                - Add product (admin)
//! POST /products/{id}           - Update product (admin)
//! POST /products/{id}/delete    - Delete product (admin)
//!
//! # Auth
//! GET  /auth/login              - Login page
//! POST /auth/login              - Login action
//! GET  /auth/register           - Sign-up page
//! POST /auth/register           - Sign-up action
//! GET  /auth/change-password    - Password change request page
//! POST /auth/change-password    - Password change request action
//! POST /auth/logout             - Logout action
//!
//! # Account (requires auth)
//! GET  /account/profile         - Profile form
//! POST /account/profile         - Save profile
//! GET  /account/orders          - The user's orders
//!
//! # Sales (admin)
//! GET  /sales                   - Every order
//! POST /sales/{id}/status       - Change an order's status
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod home;
pub mod products;
pub mod sales;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::take_flash;
use crate::models::{CurrentUser, Flash};
use crate::state::AppState;

/// Data every page layout needs: who is logged in, the pending flash
/// message and the cart badge.
pub struct Page {
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub cart_count: u32,
}

impl Page {
    /// Gather layout data, consuming the pending flash message.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: &Session, user: Option<CurrentUser>) -> Result<Self> {
        let cart = cart::load_cart(session).await?;
        Ok(Self {
            user,
            flash: take_flash(session).await,
            cart_count: cart.item_count(),
        })
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route(
            "/change-password",
            get(auth::change_password_page).post(auth::change_password),
        )
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create))
        .route("/{id}", get(products::show).post(products::update))
        .route("/{id}/delete", post(products::delete))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(account::profile).post(account::update_profile))
        .route("/orders", get(account::orders))
}

/// Create the sales routes router.
pub fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sales::index))
        .route("/{id}/status", post(sales::update_status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/cart", cart_routes())
        .nest("/products", product_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/sales", sales_routes())
}
