//! Session-related types.
//!
//! Types stored in the session for authentication state and one-shot
//! messages.

use serde::{Deserialize, Serialize};

use dyf_core::{Email, Role, Rut, UserId};

use super::user::User;

/// Session-stored user identity ("sesionUsuario").
///
/// Carries the profile fields the pages display, never the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub rut: Rut,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub shipping_address: String,
    pub role: Role,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            rut: user.rut.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            shipping_address: user.shipping_address.clone(),
            role: user.role,
        }
    }
}

/// Flash message severity, mapped to a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// CSS modifier class for the message banner.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "flash-success",
            FlashKind::Error => "flash-error",
        }
    }
}

/// Session keys.
pub mod session_keys {
    /// Key for the logged-in user.
    pub const SESSION_USER: &str = "session_user";

    /// Key for the serialized cart.
    pub const CART: &str = "cart";

    /// Key for the pending flash message.
    pub const FLASH: &str = "flash";
}
