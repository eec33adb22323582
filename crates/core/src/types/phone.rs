//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input is not exactly ten characters long.
    #[error("phone number must be exactly {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// The input contains a non-digit character.
    #[error("phone number may contain digits only")]
    NonDigit,
}

/// A ten-digit phone number.
///
/// Phone presence is half of the checkout-eligibility gate, so the format
/// is enforced at the type level: exactly ten ASCII digits, no separators,
/// no country prefix.
///
/// ```
/// use petalcart_core::Phone;
///
/// assert!(Phone::parse("9876543210").is_ok());
/// assert!(Phone::parse("98765").is_err());        // too short
/// assert!(Phone::parse("98765-43210").is_err());  // separator
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Required number of digits.
    pub const DIGITS: usize = 10;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly ten ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.len() != Self::DIGITS {
            return Err(PhoneError::WrongLength {
                expected: Self::DIGITS,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}
