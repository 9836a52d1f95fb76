//! Admin user management.
//!
//! Accounts created from the sign-up form are always customers; this is the
//! only way to create an administrator.

use dyf_core::Role;
use dyf_storefront::db::DocumentStore;
use dyf_storefront::services::auth::{AuthError, AuthService, SignUpForm};
use thiserror::Error;

use super::ConnectError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// One or more fields failed validation.
    #[error("Invalid admin data: {0}")]
    Invalid(String),

    #[error("Could not create admin: {0}")]
    Auth(#[from] AuthError),
}

/// Fields for a new administrator.
pub struct NewAdmin {
    pub rut: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub shipping_address: String,
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error if the data is invalid, the email or RUT is taken, or
/// the database is unreachable.
pub async fn create_user(admin: NewAdmin) -> Result<(), AdminError> {
    let pool = super::connect().await?;
    let store = DocumentStore::Postgres(pool);

    let form = SignUpForm {
        rut: admin.rut,
        name: admin.name,
        email: admin.email,
        confirm_password: admin.password.clone(),
        password: admin.password,
        phone: admin.phone,
        shipping_address: admin.shipping_address,
    };

    let user = AuthService::new(&store)
        .create_account(&form, Role::Admin)
        .await
        .map_err(|e| match e {
            AuthError::Validation(errors) => AdminError::Invalid(
                errors
                    .iter()
                    .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            other => AdminError::Auth(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}
