//! Product route handlers: detail page and admin writes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use dyf_core::{FieldErrors, ProductId};

use super::{Page, home};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAdmin, set_flash};
use crate::models::{Flash, Product};
use crate::services::catalog::{CatalogError, CatalogService, ProductForm};
use crate::state::AppState;

/// Product detail page template. Admins also get the edit form.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub page: Page,
    pub product: Product,
    pub form: ProductForm,
    pub errors: FieldErrors,
}

fn parse_id(raw: &str) -> Result<ProductId> {
    ProductId::parse(raw).map_err(|_| AppError::NotFound(format!("producto {raw}")))
}

/// Display a product.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<ProductTemplate> {
    let id = parse_id(&id)?;
    let product = CatalogService::new(state.store(), state.catalog_cache())
        .get(&id)
        .await?;

    Ok(ProductTemplate {
        page: Page::load(&session, user).await?,
        form: ProductForm::from_product(&product),
        product,
        errors: FieldErrors::new(),
    })
}

/// Add a product from the home page form.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let catalog = CatalogService::new(state.store(), state.catalog_cache());

    let (errors, form_error) = match catalog.add(&form).await {
        Ok(product) => {
            set_flash(
                &session,
                Flash::success(format!("{} fue agregado al catálogo", product.title)),
            )
            .await?;
            return Ok(Redirect::to("/").into_response());
        }
        Err(CatalogError::Validation(errors)) => (errors, None),
        Err(err @ CatalogError::IdExists) => (FieldErrors::new(), err.user_message()),
        Err(e) => return Err(e.into()),
    };

    let page = home::render(&state, &session, Some(admin), form, errors, form_error).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

/// Save edits to a product.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let catalog = CatalogService::new(state.store(), state.catalog_cache());

    match catalog.update(&id, &form).await {
        Ok(product) => {
            set_flash(&session, Flash::success(format!("{} fue actualizado", product.title)))
                .await?;
            Ok(Redirect::to(&format!("/products/{id}")).into_response())
        }
        Err(CatalogError::Validation(errors)) => {
            let product = catalog.get(&id).await?;
            let page = ProductTemplate {
                page: Page::load(&session, Some(admin)).await?,
                product,
                form,
                errors,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a product.
#[instrument(skip(state, session, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    CatalogService::new(state.store(), state.catalog_cache())
        .delete(&id)
        .await?;

    set_flash(&session, Flash::success("Producto eliminado")).await?;
    Ok(Redirect::to("/").into_response())
}
