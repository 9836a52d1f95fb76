//! Cart route handlers.
//!
//! The cart is a [`Cart`] value stored in the session under `cart`. Each
//! handler loads it, applies one change, writes it back and redirects to the
//! home page where the cart is rendered.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use dyf_core::{Cart, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, set_flash};
use crate::models::{Flash, session_keys};
use crate::services::catalog::CatalogService;
use crate::services::orders::{OrderError, OrderService};
use crate::state::AppState;

/// Form body naming a product in the cart.
#[derive(Debug, Deserialize)]
pub struct CartItemForm {
    pub product_id: String,
}

impl CartItemForm {
    fn product_id(&self) -> Result<ProductId> {
        ProductId::parse(&self.product_id)
            .map_err(|e| AppError::BadRequest(format!("product_id: {e}")))
    }
}

/// Load the cart from the session, or an empty one.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Write the cart back to the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Add one unit of a product.
#[instrument(skip(state, session, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartItemForm>,
) -> Result<Response> {
    let id = form.product_id()?;
    let product = CatalogService::new(state.store(), state.catalog_cache())
        .get(&id)
        .await?;

    let mut cart = load_cart(&session).await?;
    cart.add(product.to_cart_product());
    save_cart(&session, &cart).await?;

    set_flash(
        &session,
        Flash::success(format!("{} ha sido agregado al carrito", product.title)),
    )
    .await?;
    Ok(Redirect::to("/").into_response())
}

#[instrument(skip(session, form), fields(product_id = %form.product_id))]
pub async fn increment(session: Session, Form(form): Form<CartItemForm>) -> Result<Response> {
    let id = form.product_id()?;
    let mut cart = load_cart(&session).await?;
    cart.increment(&id);
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/").into_response())
}

/// Decrement a line; it disappears when it reaches zero.
#[instrument(skip(session, form), fields(product_id = %form.product_id))]
pub async fn decrement(session: Session, Form(form): Form<CartItemForm>) -> Result<Response> {
    let id = form.product_id()?;
    let mut cart = load_cart(&session).await?;
    cart.decrement(&id);
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/").into_response())
}

#[instrument(skip(session, form), fields(product_id = %form.product_id))]
pub async fn remove(session: Session, Form(form): Form<CartItemForm>) -> Result<Response> {
    let id = form.product_id()?;
    let mut cart = load_cart(&session).await?;
    cart.remove(&id);
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/").into_response())
}

#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response> {
    save_cart(&session, &Cart::new()).await?;
    Ok(Redirect::to("/").into_response())
}

/// Place an order with the cart contents, then empty the cart.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let cart = load_cart(&session).await?;

    match OrderService::new(state.store()).checkout(&user, &cart).await {
        Ok(order) => {
            save_cart(&session, &Cart::new()).await?;
            set_flash(
                &session,
                Flash::success(format!("Pedido registrado por un total de {}", order.total)),
            )
            .await?;
            Ok(Redirect::to("/account/orders").into_response())
        }
        Err(OrderError::EmptyCart) => {
            set_flash(&session, Flash::error("El carrito está vacío")).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => Err(e.into()),
    }
}
