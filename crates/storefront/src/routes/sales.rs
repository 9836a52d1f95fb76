//! Sales (admin) route handlers: every order and its status.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use dyf_core::{OrderId, OrderStatus};

use super::Page;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdmin, set_flash};
use crate::models::{Flash, Order};
use crate::services::orders::OrderService;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "sales/index.html")]
pub struct SalesTemplate {
    pub page: Page,
    pub orders: Vec<Order>,
    pub statuses: [OrderStatus; 5],
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// List every order, newest first.
#[instrument(skip(state, session, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<SalesTemplate> {
    let orders = OrderService::new(state.store()).all_orders().await?;

    Ok(SalesTemplate {
        page: Page::load(&session, Some(admin)).await?,
        orders,
        statuses: OrderStatus::ALL,
    })
}

/// Change an order's status.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let id: OrderId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("pedido {id}")))?;
    let status: OrderStatus = form
        .status
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;

    OrderService::new(state.store())
        .update_status(id, status)
        .await?;

    set_flash(
        &session,
        Flash::success(format!("Pedido actualizado a \"{}\"", status.label())),
    )
    .await?;
    Ok(Redirect::to("/sales").into_response())
}
