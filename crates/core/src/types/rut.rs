//! Chilean RUT (Rol Único Tributario) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Rut`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RutError {
    /// The input string is empty.
    #[error("RUT cannot be empty")]
    Empty,
    /// The input is not `digits-checkdigit`.
    #[error("RUT must look like 12345678-9")]
    InvalidFormat,
    /// The check digit does not match the body.
    #[error("RUT check digit is incorrect")]
    InvalidCheckDigit,
}

/// A validated RUT, stored in canonical `12345678-K` form.
///
/// Dots are accepted on input (`12.345.678-5`) and stripped. The check digit
/// is verified with the modulo-11 algorithm.
///
/// ```
/// use dyf_core::Rut;
///
/// assert_eq!(Rut::parse("11.111.111-1").unwrap().as_str(), "11111111-1");
/// assert!(Rut::parse("11111111-2").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rut(String);

impl Rut {
    /// Longest body accepted (100 million range covers every issued RUT).
    const MAX_BODY_DIGITS: usize = 9;

    /// Parse and verify a RUT.
    ///
    /// # Errors
    ///
    /// Returns `RutError::Empty` for blank input, `RutError::InvalidFormat` when
    /// the input is not `digits-checkdigit`, and `RutError::InvalidCheckDigit`
    /// when the check digit does not match.
    pub fn parse(s: &str) -> Result<Self, RutError> {
        let cleaned: String = s.trim().chars().filter(|c| *c != '.').collect();
        if cleaned.is_empty() {
            return Err(RutError::Empty);
        }

        let (body, dv) = cleaned.split_once('-').ok_or(RutError::InvalidFormat)?;
        if body.is_empty()
            || body.len() > Self::MAX_BODY_DIGITS
            || !body.chars().all(|c| c.is_ascii_digit())
        {
            return Err(RutError::InvalidFormat);
        }

        let mut dv_chars = dv.chars();
        let (Some(given), None) = (dv_chars.next(), dv_chars.next()) else {
            return Err(RutError::InvalidFormat);
        };
        let given = given.to_ascii_uppercase();
        if !(given.is_ascii_digit() || given == 'K') {
            return Err(RutError::InvalidFormat);
        }

        if check_digit(body) != given {
            return Err(RutError::InvalidCheckDigit);
        }

        let body = body.trim_start_matches('0');
        if body.is_empty() {
            return Err(RutError::InvalidFormat);
        }
        Ok(Self(format!("{body}-{given}")))
    }

    /// Returns the canonical RUT string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Compute the modulo-11 check digit for a string of ASCII digits.
fn check_digit(body: &str) -> char {
    let sum: u32 = body
        .bytes()
        .rev()
        .zip([2u32, 3, 4, 5, 6, 7].into_iter().cycle())
        .map(|(b, weight)| u32::from(b - b'0') * weight)
        .sum();

    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        // 1..=9 always fits a single decimal digit
        n => char::from_digit(n, 10).unwrap_or('0'),
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rut {
    type Error = RutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rut> for String {
    fn from(rut: Rut) -> Self {
        rut.0
    }
}
