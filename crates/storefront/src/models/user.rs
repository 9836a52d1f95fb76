//! User accounts.

use serde::{Deserialize, Serialize};

use dyf_core::{Email, Role, Rut, UserId};

/// A store account, customer or admin.
///
/// Stored in the `users` collection under its `id`. Email and RUT are
/// unique across accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub rut: Rut,
    pub name: String,
    pub email: Email,
    /// Argon2 PHC string. Never leaves the server.
    pub password_hash: String,
    pub phone: String,
    pub shipping_address: String,
    pub role: Role,
}

impl User {
    /// Returns `true` for administrators.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Partial update of a user document. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<Rut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
}
