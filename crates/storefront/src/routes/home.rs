//! Home page: catalog, cart and the admin product form.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use dyf_core::{Cart, FieldErrors};

use super::Page;
use super::cart::load_cart;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Product};
use crate::services::catalog::{CatalogService, ProductForm};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: Page,
    pub products: Vec<Product>,
    pub cart: Cart,
    pub product_form: ProductForm,
    pub errors: FieldErrors,
    pub form_error: Option<&'static str>,
}

/// Display the home page.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate> {
    render(&state, &session, user, ProductForm::default(), FieldErrors::new(), None).await
}

/// Build the home page, optionally with a rejected product form.
///
/// # Errors
///
/// Returns an error if the catalog or session store fails.
pub async fn render(
    state: &AppState,
    session: &Session,
    user: Option<CurrentUser>,
    product_form: ProductForm,
    errors: FieldErrors,
    form_error: Option<&'static str>,
) -> Result<HomeTemplate> {
    let products = CatalogService::new(state.store(), state.catalog_cache())
        .list()
        .await?;
    let cart = load_cart(session).await?;

    Ok(HomeTemplate {
        page: Page::load(session, user).await?,
        products,
        cart,
        product_form,
        errors,
        form_error,
    })
}
