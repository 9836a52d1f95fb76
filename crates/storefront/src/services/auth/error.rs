//! Authentication error types.

use thiserror::Error;

use dyf_core::FieldErrors;

use crate::db::RepositoryError;
use crate::password::PasswordError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more form fields are invalid.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// No account uses the submitted email.
    #[error("email not registered")]
    EmailNotRegistered,

    /// The email exists but the password does not match.
    #[error("incorrect password")]
    IncorrectPassword,

    /// Another account already uses this email.
    #[error("email already registered")]
    EmailTaken,

    /// Another account already uses this RUT.
    #[error("rut already registered")]
    RutTaken,

    /// The account behind the session no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Hash => Self::PasswordHash,
            PasswordError::Mismatch => Self::IncorrectPassword,
        }
    }
}

impl AuthError {
    /// The message shown on the form, for errors the user can act on.
    #[must_use]
    pub const fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::EmailNotRegistered => Some("El correo ingresado no está registrado"),
            Self::IncorrectPassword => Some("La contraseña ingresada es incorrecta"),
            Self::EmailTaken => Some("Este correo ya está registrado"),
            Self::RutTaken => Some("Este RUT ya está registrado"),
            _ => None,
        }
    }

    /// Field errors to render next to the inputs, if this error maps to any.
    #[must_use]
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::EmailTaken => Some(single("email", self)),
            Self::RutTaken => Some(single("rut", self)),
            Self::IncorrectPassword => Some(single("password", self)),
            _ => None,
        }
    }
}

fn single(field: &str, error: &AuthError) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(message) = error.user_message() {
        errors.add(field, message);
    }
    errors
}
