//! Account service: registration, login, password change requests and
//! profile edits.

mod error;

pub use error::AuthError;

use serde::Deserialize;
use tracing::instrument;

use dyf_core::validation::{passwords_match, required, validate_email, validate_rut};
use dyf_core::{FieldErrors, PasswordPolicy, Role, UserId};

use crate::db::{DocumentStore, RepositoryError, UserRepository};
use crate::models::{CurrentUser, User, UserPatch};
use crate::password::{hash_password, verify_password};

/// Sign-up form fields.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignUpForm {
    pub rut: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub shipping_address: String,
}

/// Login form fields.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Password change request form.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct PasswordChangeForm {
    pub email: String,
}

/// Profile form fields. A blank password keeps the current one.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub rut: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub shipping_address: String,
}

/// Result of a password change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChangeRequest {
    /// The email belongs to an account; reset instructions were queued.
    EmailSent,
    /// No account uses this email.
    NotRegistered,
}

/// Confirmation shown after a successful sign-up.
#[must_use]
pub fn registration_message(name: &str) -> String {
    format!("¡{name}, tu información ha sido guardada exitosamente!")
}

/// Account service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(store: &'a DocumentStore) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field is invalid,
    /// `AuthError::EmailTaken` or `AuthError::RutTaken` for duplicates.
    pub async fn register(&self, form: &SignUpForm) -> Result<User, AuthError> {
        self.create_account(form, Role::Customer).await
    }

    /// Create an account with an explicit role. Used by the CLI to create
    /// administrators.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    #[instrument(skip(self, form), fields(email = %form.email.trim()))]
    pub async fn create_account(&self, form: &SignUpForm, role: Role) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();
        let rut = errors.check("rut", validate_rut(&form.rut));
        let name = errors.check("name", required(&form.name));
        let email = errors.check("email", validate_email(&form.email));
        errors.extend("password", PasswordPolicy::SignUp.check(&form.password));
        if errors
            .check("confirm_password", required(&form.confirm_password))
            .is_some()
        {
            errors.check(
                "confirm_password",
                passwords_match(&form.password, &form.confirm_password),
            );
        }
        let phone = errors.check("phone", required(&form.phone));
        let shipping_address = errors.check("shipping_address", required(&form.shipping_address));

        let (Some(rut), Some(name), Some(email), Some(phone), Some(shipping_address), true) =
            (rut, name, email, phone, shipping_address, errors.is_empty())
        else {
            return Err(AuthError::Validation(errors));
        };

        if self.users.email_registered(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.users.rut_registered(&rut).await? {
            return Err(AuthError::RutTaken);
        }

        let user = User {
            id: UserId::generate(),
            rut,
            name: name.to_owned(),
            email,
            password_hash: hash_password(&form.password)?,
            phone: phone.to_owned(),
            shipping_address: shipping_address.to_owned(),
            role,
        };

        self.users.create(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(msg) if msg.contains("rut") => AuthError::RutTaken,
            RepositoryError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for malformed input,
    /// `AuthError::EmailNotRegistered` if no account uses the email, and
    /// `AuthError::IncorrectPassword` if the password does not match.
    #[instrument(skip(self, form), fields(email = %form.email.trim()))]
    pub async fn login(&self, form: &LoginForm) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();
        let email = errors.check("email", validate_email(&form.email));
        errors.check("password", required(&form.password));
        let (Some(email), true) = (email, errors.is_empty()) else {
            return Err(AuthError::Validation(errors));
        };

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::EmailNotRegistered)?;

        verify_password(&form.password, &user.password_hash)?;
        Ok(user)
    }

    /// Handle a "forgot password" request.
    ///
    /// No mail is sent; a registered address is logged so an operator can
    /// follow up.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the email is malformed.
    #[instrument(skip(self, form))]
    pub async fn request_password_change(
        &self,
        form: &PasswordChangeForm,
    ) -> Result<PasswordChangeRequest, AuthError> {
        let email = validate_email(&form.email).map_err(|e| {
            let mut errors = FieldErrors::new();
            errors.add("email", e);
            AuthError::Validation(errors)
        })?;

        match self.users.find_by_email(&email).await? {
            Some(user) => {
                tracing::info!(user_id = %user.id, "Password change requested");
                Ok(PasswordChangeRequest::EmailSent)
            }
            None => Ok(PasswordChangeRequest::NotRegistered),
        }
    }

    /// Update the logged-in user's profile.
    ///
    /// Email and role are fixed. A blank password keeps the stored hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field is invalid,
    /// `AuthError::RutTaken` if the new RUT belongs to someone else, and
    /// `AuthError::UserNotFound` if the account was removed.
    #[instrument(skip(self, current, form), fields(user_id = %current.id))]
    pub async fn update_profile(
        &self,
        current: &CurrentUser,
        form: &ProfileForm,
    ) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();
        let rut = errors.check("rut", validate_rut(&form.rut));
        let name = errors.check("name", required(&form.name));
        errors.extend("password", PasswordPolicy::Profile.check(&form.password));
        errors.check(
            "confirm_password",
            passwords_match(&form.password, &form.confirm_password),
        );
        let phone = errors.check("phone", required(&form.phone));
        let shipping_address = errors.check("shipping_address", required(&form.shipping_address));

        let (Some(rut), Some(name), Some(phone), Some(shipping_address), true) =
            (rut, name, phone, shipping_address, errors.is_empty())
        else {
            return Err(AuthError::Validation(errors));
        };

        if rut != current.rut
            && let Some(owner) = self.users.find_by_rut(&rut).await?
            && owner.id != current.id
        {
            return Err(AuthError::RutTaken);
        }

        let password_hash = if form.password.is_empty() {
            None
        } else {
            Some(hash_password(&form.password)?)
        };

        let patch = UserPatch {
            rut: Some(rut),
            name: Some(name.to_owned()),
            password_hash,
            phone: Some(phone.to_owned()),
            shipping_address: Some(shipping_address.to_owned()),
        };

        self.users
            .update_by_email(&current.email, &patch)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                RepositoryError::Conflict(_) => AuthError::RutTaken,
                other => AuthError::Repository(other),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign_up(email: &str, rut: &str) -> SignUpForm {
        SignUpForm {
            rut: rut.to_string(),
            name: "Ana Pérez".to_string(),
            email: email.to_string(),
            password: "Qwerty123$".to_string(),
            confirm_password: "Qwerty123$".to_string(),
            phone: "912345678".to_string(),
            shipping_address: "Av. Siempre Viva 742".to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_password_errors_map_to_auth_errors() {
        use crate::password::PasswordError;

        assert!(matches!(
            AuthError::from(PasswordError::Mismatch),
            AuthError::IncorrectPassword
        ));
        assert!(matches!(
            AuthError::from(PasswordError::Hash),
            AuthError::PasswordHash
        ));
    }

    #[test]
    fn test_registration_message() {
        assert_eq!(
            registration_message("Ana"),
            "¡Ana, tu información ha sido guardada exitosamente!"
        );
    }

    #[tokio::test]
    async fn test_register_creates_customer_with_hashed_password() {
        let store = DocumentStore::memory();
        let auth = AuthService::new(&store);

        let user = auth
            .register(&sign_up(" Ana@DyF.cl ", "11.111.111-1"))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.email.as_str(), "ana@dyf.cl");
        assert_eq!(user.rut.as_str(), "11111111-1");
        assert_ne!(user.password_hash, "Qwerty123$");
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_and_mismatch() {
        let store = DocumentStore::memory();
        let auth = AuthService::new(&store);
        let mut form = sign_up("ana@dyf.cl", "11111111-1");
        form.password = "qwerty123$".to_string();
        form.confirm_password = "qwerty123%".to_string();

        let Err(AuthError::Validation(errors)) = auth.register(&form).await else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("password"),
            ["La contraseña debe contener al menos una letra mayúscula"]
        );
        assert_eq!(
            errors.first("confirm_password"),
            Some("Las contraseñas no coinciden")
        );
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let store = DocumentStore::memory();
        let auth = AuthService::new(&store);
        auth.register(&sign_up("ana@dyf.cl", "11111111-1"))
            .await
            .unwrap();

        assert!(matches!(
            auth.register(&sign_up("ANA@dyf.cl", "12345678-5")).await,
            Err(AuthError::EmailTaken)
        ));
        assert!(matches!(
            auth.register(&sign_up("beto@dyf.cl", "11111111-1")).await,
            Err(AuthError::RutTaken)
        ));
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let store = DocumentStore::memory();
        let auth = AuthService::new(&store);
        auth.register(&sign_up("ana@dyf.cl", "11111111-1"))
            .await
            .unwrap();

        assert!(matches!(
            auth.login(&login("nadie@dyf.cl", "Qwerty123$")).await,
            Err(AuthError::EmailNotRegistered)
        ));

        let err = auth
            .login(&login("ana@dyf.cl", "Qwerty123%"))
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            Some("La contraseña ingresada es incorrecta")
        );

        let user = auth.login(&login("ana@dyf.cl", "Qwerty123$")).await.unwrap();
        assert_eq!(user.name, "Ana Pérez");

        assert!(matches!(
            auth.login(&login("", "")).await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_request_password_change() {
        let store = DocumentStore::memory();
        let auth = AuthService::new(&store);
        auth.register(&sign_up("ana@dyf.cl", "11111111-1"))
            .await
            .unwrap();

        let form = |email: &str| PasswordChangeForm {
            email: email.to_string(),
        };
        assert_eq!(
            auth.request_password_change(&form("ana@dyf.cl")).await.unwrap(),
            PasswordChangeRequest::EmailSent
        );
        assert_eq!(
            auth.request_password_change(&form("otro@dyf.cl"))
                .await
                .unwrap(),
            PasswordChangeRequest::NotRegistered
        );
        assert!(auth.request_password_change(&form("otro")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_profile_blank_password_keeps_hash() {
        let store = DocumentStore::memory();
        let auth = AuthService::new(&store);
        let user = auth
            .register(&sign_up("ana@dyf.cl", "11111111-1"))
            .await
            .unwrap();
        let current = CurrentUser::from(&user);

        let form = ProfileForm {
            rut: "11111111-1".to_string(),
            name: "Ana María".to_string(),
            password: String::new(),
            confirm_password: String::new(),
            phone: "987654321".to_string(),
            shipping_address: "Los Olmos 12".to_string(),
        };
        let updated = auth.update_profile(&current, &form).await.unwrap();

        assert_eq!(updated.name, "Ana María");
        assert_eq!(updated.password_hash, user.password_hash);
        assert!(auth.login(&login("ana@dyf.cl", "Qwerty123$")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_new_password() {
        let store = DocumentStore::memory();
        let auth = AuthService::new(&store);
        let user = auth
            .register(&sign_up("ana@dyf.cl", "11111111-1"))
            .await
            .unwrap();
        let current = CurrentUser::from(&user);

        let mut form = ProfileForm {
            rut: "11111111-1".to_string(),
            name: "Ana".to_string(),
            password: "Nueva#1".to_string(),
            confirm_password: "Otra#1".to_string(),
            phone: "912345678".to_string(),
            shipping_address: "Av. Siempre Viva 742".to_string(),
        };
        assert!(matches!(
            auth.update_profile(&current, &form).await,
            Err(AuthError::Validation(_))
        ));

        form.confirm_password = "Nueva#1".to_string();
        auth.update_profile(&current, &form).await.unwrap();
        assert!(auth.login(&login("ana@dyf.cl", "Nueva#1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_rut() {
        let store = DocumentStore::memory();
        let auth = AuthService::new(&store);
        let ana = auth
            .register(&sign_up("ana@dyf.cl", "11111111-1"))
            .await
            .unwrap();
        auth.register(&sign_up("beto@dyf.cl", "12345678-5"))
            .await
            .unwrap();

        let form = ProfileForm {
            rut: "12345678-5".to_string(),
            name: "Ana".to_string(),
            phone: "912345678".to_string(),
            shipping_address: "Av. Siempre Viva 742".to_string(),
            ..ProfileForm::default()
        };
        assert!(matches!(
            auth.update_profile(&CurrentUser::from(&ana), &form).await,
            Err(AuthError::RutTaken)
        ));
    }
}
