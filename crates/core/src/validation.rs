//! Form field rules.
//!
//! Every form in the store (sign-up, login, password change, profile, product)
//! runs its inputs through these validators and collects the failures in a
//! [`FieldErrors`] map keyed by field name. Messages are the Spanish strings
//! shown next to each input.

use serde::Serialize;

use crate::types::{Email, EmailError, Price, PriceError, ProductId, ProductIdError, Rut, RutError};

/// A single field-level validation failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Blank input for a required field.
    #[error("Este campo es obligatorio")]
    Required,
    /// The email does not have the shape `local@domain`.
    #[error("Ingrese un correo electrónico válido")]
    InvalidEmail,
    /// The RUT is not `digits-checkdigit`.
    #[error("Ingrese un RUT válido (ej: 12345678-5)")]
    InvalidRut,
    /// The RUT check digit does not match its body.
    #[error("El dígito verificador del RUT no es válido")]
    RutCheckDigit,
    /// Password length out of range.
    #[error("La contraseña debe tener entre {min} y {max} caracteres")]
    PasswordLength {
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
    #[error("La contraseña debe contener al menos una letra mayúscula")]
    MissingUppercase,
    #[error("La contraseña debe contener al menos una letra minúscula")]
    MissingLowercase,
    #[error("La contraseña debe contener al menos un número")]
    MissingDigit,
    /// The password has no special character. The payload lists the accepted
    /// characters, or is empty when any symbol counts.
    #[error("La contraseña debe contener al menos un carácter especial{0}")]
    MissingSpecial(&'static str),
    /// Password and confirmation differ.
    #[error("Las contraseñas no coinciden")]
    PasswordMismatch,
    #[error("El ID solo puede contener letras, números, '-' y '_'")]
    InvalidProductId,
    #[error("El ID no puede superar los {max} caracteres")]
    ProductIdTooLong {
        /// Maximum length.
        max: usize,
    },
    #[error("El precio debe ser un número")]
    InvalidPrice,
    #[error("El precio no puede ser negativo")]
    NegativePrice,
    #[error("El precio no puede superar {}", Price::MAX)]
    PriceTooHigh,
}

/// Validation failures for a whole form, in field order.
///
/// Fields keep the order in which they were first reported so the summary
/// at the top of a form lists them the way the inputs appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`.
    pub fn add(&mut self, field: &str, message: impl ToString) {
        let message = message.to_string();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.fields.push((field.to_owned(), vec![message])),
        }
    }

    /// Record the error of `result` under `field`, passing the value through.
    ///
    /// Lets a form validator read like a list of fields:
    ///
    /// ```
    /// use dyf_core::FieldErrors;
    /// use dyf_core::validation::{required, validate_email};
    ///
    /// let mut errors = FieldErrors::new();
    /// let name = errors.check("name", required("Ana"));
    /// let email = errors.check("email", validate_email("not-an-email"));
    /// assert_eq!(name, Some("Ana"));
    /// assert!(email.is_none());
    /// assert!(errors.contains("email"));
    /// ```
    pub fn check<T>(&mut self, field: &str, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.add(field, error);
                None
            }
        }
    }

    /// Record every error in `errors` under `field`.
    pub fn extend(&mut self, field: &str, errors: impl IntoIterator<Item = FieldError>) {
        for error in errors {
            self.add(field, error);
        }
    }

    /// Returns `true` when no field has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` when `field` has at least one message.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or_default()
    }

    /// First message recorded for `field`.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// Iterate over `(field, messages)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }

    /// `Ok(())` when empty, otherwise the errors themselves.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Require a non-blank value. Returns the trimmed input.
///
/// # Errors
///
/// Returns `FieldError::Required` if the trimmed value is empty.
pub fn required(value: &str) -> Result<&str, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FieldError::Required)
    } else {
        Ok(value)
    }
}

/// Validate a required email address.
///
/// # Errors
///
/// Returns `Required` for blank input and `InvalidEmail` otherwise.
pub fn validate_email(value: &str) -> Result<Email, FieldError> {
    Email::parse(value).map_err(|e| match e {
        EmailError::Empty => FieldError::Required,
        _ => FieldError::InvalidEmail,
    })
}

/// Validate a required RUT, including its check digit.
///
/// # Errors
///
/// Returns `Required`, `InvalidRut` or `RutCheckDigit`.
pub fn validate_rut(value: &str) -> Result<Rut, FieldError> {
    Rut::parse(value).map_err(|e| match e {
        RutError::Empty => FieldError::Required,
        RutError::InvalidFormat => FieldError::InvalidRut,
        RutError::InvalidCheckDigit => FieldError::RutCheckDigit,
    })
}

/// Validate a required product id.
///
/// # Errors
///
/// Returns `Required`, `ProductIdTooLong` or `InvalidProductId`.
pub fn validate_product_id(value: &str) -> Result<ProductId, FieldError> {
    ProductId::parse(value).map_err(|e| match e {
        ProductIdError::Empty => FieldError::Required,
        ProductIdError::TooLong { max } => FieldError::ProductIdTooLong { max },
        ProductIdError::InvalidCharacters => FieldError::InvalidProductId,
    })
}

/// Validate a required, non-negative price.
///
/// # Errors
///
/// Returns `Required`, `InvalidPrice`, `NegativePrice` or `PriceTooHigh`.
pub fn validate_price(value: &str) -> Result<Price, FieldError> {
    Price::parse(value).map_err(|e| match e {
        PriceError::Empty => FieldError::Required,
        PriceError::NotANumber => FieldError::InvalidPrice,
        PriceError::Negative => FieldError::NegativePrice,
        PriceError::TooHigh => FieldError::PriceTooHigh,
    })
}

/// Cross-field check between a password and its confirmation.
///
/// # Errors
///
/// Returns `FieldError::PasswordMismatch` if the two differ.
pub fn passwords_match(password: &str, confirmation: &str) -> Result<(), FieldError> {
    if password == confirmation {
        Ok(())
    } else {
        Err(FieldError::PasswordMismatch)
    }
}

/// Password strength rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    /// Registration: required, 8 to 20 characters, upper, lower, digit and
    /// one of `@$!%*?&`.
    SignUp,
    /// Profile edit: blank keeps the current password. Otherwise upper,
    /// lower, digit and any non-alphanumeric character.
    Profile,
}

impl PasswordPolicy {
    /// Minimum sign-up password length.
    pub const MIN_LENGTH: usize = 8;
    /// Maximum sign-up password length.
    pub const MAX_LENGTH: usize = 20;
    /// Characters that satisfy the sign-up special-character rule.
    pub const SIGN_UP_SPECIALS: &'static str = "@$!%*?&";

    /// Check `password`, reporting every rule it breaks.
    #[must_use]
    pub fn check(self, password: &str) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if password.is_empty() {
            if self == Self::SignUp {
                errors.push(FieldError::Required);
            }
            return errors;
        }

        if self == Self::SignUp {
            let len = password.chars().count();
            if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
                errors.push(FieldError::PasswordLength {
                    min: Self::MIN_LENGTH,
                    max: Self::MAX_LENGTH,
                });
            }
        }

        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(FieldError::MissingUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(FieldError::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(FieldError::MissingDigit);
        }

        match self {
            Self::SignUp => {
                if !password.chars().any(|c| Self::SIGN_UP_SPECIALS.contains(c)) {
                    errors.push(FieldError::MissingSpecial(" (@$!%*?&)"));
                }
            }
            Self::Profile => {
                if password.chars().all(|c| c.is_ascii_alphanumeric()) {
                    errors.push(FieldError::MissingSpecial(""));
                }
            }
        }

        errors
    }
}
