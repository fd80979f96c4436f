//! Validated user input: phone numbers, purchase and payment codes, OTPs
//! and email addresses.
//!
//! Every type here is constructed through a `parse` that normalizes and
//! validates the raw input. Validation happens before any network call is
//! made, so a value of one of these types is always well-formed.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Country code prefix for the supported mobile-money network.
pub const PHONE_PREFIX: &str = "+254";

/// Digits expected after the country code.
const PHONE_SUBSCRIBER_DIGITS: usize = 9;

/// Length of a provider payment confirmation code.
const PAYMENT_CODE_LEN: usize = 10;

/// Validation failures for user-entered values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Phone number is not a `+254` number with 9 subscriber digits.
    #[error("invalid phone number: expected {PHONE_PREFIX} followed by 9 digits")]
    InvalidPhoneNumber,

    /// Purchase code is not exactly 4 digits.
    #[error("invalid purchase code: expected exactly 4 digits")]
    InvalidPurchaseCode,

    /// Payment confirmation code is not 10 alphanumeric characters.
    #[error("invalid payment code: expected 10 letters or digits")]
    InvalidPaymentCode,

    /// One-time code is not exactly 6 digits.
    #[error("invalid one-time code: expected exactly 6 digits")]
    InvalidOtp,

    /// Email address is malformed.
    #[error("invalid email address")]
    InvalidEmail,
}

/// A mobile-money phone number in the provider's local format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parses a phone number, trimming surrounding whitespace.
    ///
    /// Accepts only `+254` followed by exactly 9 digits.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let rest = trimmed
            .strip_prefix(PHONE_PREFIX)
            .ok_or(ValidationError::InvalidPhoneNumber)?;
        if rest.len() != PHONE_SUBSCRIBER_DIGITS || !rest.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidPhoneNumber);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the normalized number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The 4-digit purchase code issued with a license order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseCode(String);

impl PurchaseCode {
    /// Parses a purchase code: exactly 4 ASCII digits.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidPurchaseCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PurchaseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A provider payment confirmation code (e.g. an M-PESA receipt number).
///
/// Normalized to uppercase before validation, matching how the provider
/// prints them in confirmation messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentCode(String);

impl PaymentCode {
    /// Parses a payment code: 10 alphanumeric characters, case-insensitive
    /// on input, stored uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        if !Self::is_valid_format(&normalized) {
            return Err(ValidationError::InvalidPaymentCode);
        }
        Ok(Self(normalized))
    }

    /// Returns true if the (already uppercased) input matches the expected
    /// shape. Used to gate the submit action without constructing a value.
    #[must_use]
    pub fn is_valid_format(code: &str) -> bool {
        code.len() == PAYMENT_CODE_LEN
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 6-digit one-time code sent by email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Parses an OTP: exactly 6 ASCII digits.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidOtp);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A syntactically plausible email address.
///
/// This is the same lightweight check the purchase form applies: one `@`
/// with a non-empty local part and a dotted domain. Deliverability is the
/// server's problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses an email address, trimming surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let (local, domain) = trimmed.split_once('@').ok_or(ValidationError::InvalidEmail)?;
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || local.contains(char::is_whitespace)
            || domain.contains(char::is_whitespace)
        {
            return Err(ValidationError::InvalidEmail);
        }
        let (host, tld) = domain.rsplit_once('.').ok_or(ValidationError::InvalidEmail)?;
        if host.is_empty() || tld.is_empty() {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
