//! Account route handlers (profile and order history).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use dyf_core::FieldErrors;

use super::Page;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, refresh_session_user, set_flash};
use crate::models::{CurrentUser, Flash, Order};
use crate::services::auth::{AuthService, ProfileForm};
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Profile page template. Email and role are shown read-only.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub page: Page,
    pub email: String,
    pub form: ProfileForm,
    pub errors: FieldErrors,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub page: Page,
    pub orders: Vec<Order>,
}

fn prefill(user: &CurrentUser) -> ProfileForm {
    ProfileForm {
        rut: user.rut.to_string(),
        name: user.name.clone(),
        password: String::new(),
        confirm_password: String::new(),
        phone: user.phone.clone(),
        shipping_address: user.shipping_address.clone(),
    }
}

/// Display the profile form.
pub async fn profile(session: Session, RequireAuth(user): RequireAuth) -> Result<ProfileTemplate> {
    Ok(ProfileTemplate {
        email: user.email.to_string(),
        form: prefill(&user),
        errors: FieldErrors::new(),
        page: Page::load(&session, Some(user)).await?,
    })
}

/// Save the profile. A blank password keeps the current one.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    match AuthService::new(state.store())
        .update_profile(&user, &form)
        .await
    {
        Ok(updated) => {
            refresh_session_user(&session, &CurrentUser::from(&updated)).await?;
            set_flash(&session, Flash::success("Datos actualizados con éxito.")).await?;
            Ok(Redirect::to("/account/profile").into_response())
        }
        Err(err) => {
            let Some(errors) = err.field_errors() else {
                return Err(err.into());
            };
            let page = ProfileTemplate {
                email: user.email.to_string(),
                form: ProfileForm {
                    password: String::new(),
                    confirm_password: String::new(),
                    ..form
                },
                errors,
                page: Page::load(&session, Some(user)).await?,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// Orders placed by the logged-in user.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<OrdersTemplate> {
    let orders = OrderService::new(state.store())
        .orders_for(&user.email)
        .await?;

    Ok(OrdersTemplate {
        page: Page::load(&session, Some(user)).await?,
        orders,
    })
}
