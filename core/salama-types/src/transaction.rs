//! The purchase transaction record.
//!
//! A `Transaction` tracks one attempted mobile-money payment from initiation
//! through completion and email association. At most one non-terminal
//! transaction exists at a time; it is the record the local store persists
//! so an interrupted purchase can resume after a reload.

use crate::codes::PaymentCode;
use crate::ids::{CheckoutRequestId, TransactionId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Hours before a persisted transaction is considered stale and dropped.
pub const TRANSACTION_TTL_HOURS: i64 = 24;

/// Server-side status of a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Created, mobile-money prompt not yet confirmed.
    Pending,
    /// Provider is processing the payment.
    Processing,
    /// Payment confirmed by the provider.
    Completed,
    /// Payment failed on the provider side.
    Failed,
}

impl TransactionStatus {
    /// Parses a status value from the API, which is inconsistent about
    /// casing ("Completed", "COMPLETED", "completed" all occur).
    #[must_use]
    pub fn from_api_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true once the provider will not change the status again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Payment details reported by the server once a transaction completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    /// Provider receipt / confirmation code, when the server reports one.
    pub mpesa_receipt: Option<PaymentCode>,
    /// Email the server already has on file for this payment, if any.
    pub user_email: Option<String>,
}

/// A single attempted mobile-money payment, tracked end-to-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Server-assigned transaction ID.
    pub transaction_id: TransactionId,
    /// Provider-side checkout reference, when issued.
    pub checkout_request_id: Option<CheckoutRequestId>,
    /// Last observed status.
    pub status: TransactionStatus,
    /// Provider confirmation code, once known.
    pub payment_code: Option<PaymentCode>,
    /// When this transaction was created locally.
    pub created_at: DateTime<Utc>,
    /// Email bound to the transaction, once identity verification succeeds.
    pub associated_email: Option<String>,
}

impl Transaction {
    /// Creates a freshly initiated transaction, stamped with the current
    /// time and in `Pending` status.
    #[must_use]
    pub fn new(transaction_id: TransactionId, checkout_request_id: Option<CheckoutRequestId>) -> Self {
        Self {
            transaction_id,
            checkout_request_id,
            status: TransactionStatus::Pending,
            payment_code: None,
            created_at: Utc::now(),
            associated_email: None,
        }
    }

    /// Returns true if the payment completed but no email is bound yet,
    /// i.e. the purchase still needs identity verification.
    #[must_use]
    pub fn needs_verification(&self) -> bool {
        self.status == TransactionStatus::Completed && self.associated_email.is_none()
    }

    /// Returns true if the payment is still awaiting provider confirmation.
    #[must_use]
    pub fn awaiting_payment(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Pending | TransactionStatus::Processing
        )
    }

    /// Returns true if this record is older than the given TTL relative
    /// to `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::hours(TRANSACTION_TTL_HOURS)
    }

    /// Returns true if this record is older than 24 hours.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
