//! Authentication route handlers.
//!
//! Login, sign-up, password change requests and logout. Rejected forms are
//! re-rendered with 422 and the submitted values, minus passwords.

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
use crate::middleware::{OptionalAuth, clear_session_user, set_flash, set_session_user};
use crate::models::{CurrentUser, Flash};
use crate::services::auth::{
    AuthError, AuthService, LoginForm, PasswordChangeForm, PasswordChangeRequest, SignUpForm,
    registration_message,
};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: Page,
    pub email: String,
    pub errors: FieldErrors,
    pub email_not_registered: bool,
    pub incorrect_password: Option<&'static str>,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: Page,
    pub form: SignUpForm,
    pub errors: FieldErrors,
}

/// Password change request page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/change_password.html")]
pub struct ChangePasswordTemplate {
    pub page: Page,
    pub email: String,
    pub errors: FieldErrors,
    pub email_sent: bool,
    pub email_not_registered: bool,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(session: Session, OptionalAuth(user): OptionalAuth) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(LoginTemplate {
        page: Page::load(&session, None).await?,
        email: String::new(),
        errors: FieldErrors::new(),
        email_not_registered: false,
        incorrect_password: None,
    }
    .into_response())
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let user = match AuthService::new(state.store()).login(&form).await {
        Ok(user) => user,
        Err(
            err @ (AuthError::Validation(_)
            | AuthError::EmailNotRegistered
            | AuthError::IncorrectPassword),
        ) => {
            let page = LoginTemplate {
                page: Page::load(&session, None).await?,
                email: form.email,
                errors: match &err {
                    AuthError::Validation(errors) => errors.clone(),
                    _ => FieldErrors::new(),
                },
                email_not_registered: matches!(err, AuthError::EmailNotRegistered),
                incorrect_password: match err {
                    AuthError::IncorrectPassword => err.user_message(),
                    _ => None,
                },
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    set_session_user(&session, &CurrentUser::from(&user)).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    set_flash(&session, Flash::success(format!("Bienvenido, {}", user.name))).await?;
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn register_page(session: Session, OptionalAuth(user): OptionalAuth) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(RegisterTemplate {
        page: Page::load(&session, None).await?,
        form: SignUpForm::default(),
        errors: FieldErrors::new(),
    }
    .into_response())
}

/// Handle sign-up form submission.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Result<Response> {
    match AuthService::new(state.store()).register(&form).await {
        Ok(user) => {
            set_flash(&session, Flash::success(registration_message(&user.name))).await?;
            Ok(Redirect::to("/auth/login").into_response())
        }
        Err(err) => {
            let Some(errors) = err.field_errors() else {
                return Err(err.into());
            };
            let page = RegisterTemplate {
                page: Page::load(&session, None).await?,
                form: SignUpForm {
                    password: String::new(),
                    confirm_password: String::new(),
                    ..form
                },
                errors,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

// =============================================================================
// Password Change Routes
// =============================================================================

/// Display the password change request page.
pub async fn change_password_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<ChangePasswordTemplate> {
    let email = user
        .as_ref()
        .map(|u| u.email.to_string())
        .unwrap_or_default();

    Ok(ChangePasswordTemplate {
        page: Page::load(&session, user).await?,
        email,
        errors: FieldErrors::new(),
        email_sent: false,
        email_not_registered: false,
    })
}

/// Handle a password change request.
#[instrument(skip(state, session, user, form))]
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<PasswordChangeForm>,
) -> Result<Response> {
    let outcome = AuthService::new(state.store())
        .request_password_change(&form)
        .await;

    let (status, errors, outcome) = match outcome {
        Ok(outcome) => (StatusCode::OK, FieldErrors::new(), Some(outcome)),
        Err(AuthError::Validation(errors)) => (StatusCode::UNPROCESSABLE_ENTITY, errors, None),
        Err(e) => return Err(e.into()),
    };

    let page = ChangePasswordTemplate {
        page: Page::load(&session, user).await?,
        email: form.email,
        errors,
        email_sent: outcome == Some(PasswordChangeRequest::EmailSent),
        email_not_registered: outcome == Some(PasswordChangeRequest::NotRegistered),
    };
    Ok((status, page).into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Clear the session and return home.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    clear_session_user(&session).await?;
    set_flash(&session, Flash::success("Sesión cerrada")).await?;
    Ok(Redirect::to("/").into_response())
}
