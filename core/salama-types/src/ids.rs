//! Identifier types handed out by the license server.
//!
//! Both identifiers are opaque server-assigned strings. The transaction ID
//! tracks a purchase end-to-end; the checkout request ID correlates an
//! in-flight mobile-money prompt on the provider side and is not always
//! present.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a purchase transaction, assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wraps a server-assigned transaction ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Provider-issued correlation ID for an in-flight mobile-money prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutRequestId(String);

impl CheckoutRequestId {
    /// Wraps a provider-assigned checkout request ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckoutRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CheckoutRequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
