//! The `LicenseApi` trait: everything the portal core asks the server for.

use crate::error::ApiResult;
use async_trait::async_trait;
use salama_types::{
    CheckoutRequestId, EmailAddress, License, OtpCode, PaymentCode, PaymentConfirmation,
    PhoneNumber, PurchaseCode, TransactionId, TransactionStatus,
};

/// Identifiers returned when a purchase is successfully initiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseInitiated {
    /// Server-assigned transaction ID.
    pub transaction_id: TransactionId,
    /// Provider checkout reference, when the prompt was issued.
    pub checkout_request_id: Option<CheckoutRequestId>,
}

/// One observation of a transaction's server-side status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatusReport {
    /// Current status.
    pub status: TransactionStatus,
    /// Payment details, populated once the transaction completes.
    pub confirmation: PaymentConfirmation,
}

/// Operations exposed by the external license API.
///
/// The flow crate depends on this trait rather than on the HTTP client so
/// the whole purchase state machine can run against a scripted server in
/// tests.
#[async_trait]
pub trait LicenseApi: Send + Sync {
    /// Starts a mobile-money payment. The provider pushes a payment prompt
    /// to the given phone; the returned IDs are used to poll for the
    /// outcome.
    async fn initiate_purchase(
        &self,
        phone: &PhoneNumber,
        purchase_code: &PurchaseCode,
    ) -> ApiResult<PurchaseInitiated>;

    /// Fetches the current status of a transaction.
    async fn transaction_status(
        &self,
        transaction_id: &TransactionId,
        checkout_request_id: Option<&CheckoutRequestId>,
    ) -> ApiResult<TransactionStatusReport>;

    /// Verifies a manually entered payment confirmation code against a
    /// transaction. Used when polling timed out but the user did pay.
    async fn verify_payment_code(
        &self,
        transaction_id: &TransactionId,
        payment_code: &PaymentCode,
    ) -> ApiResult<PaymentConfirmation>;

    /// Asks the server to email a one-time code. The transaction ID and
    /// payment code tie the OTP to a purchase when one is in flight; a
    /// plain sign-in sends neither.
    async fn request_otp(
        &self,
        email: &EmailAddress,
        transaction_id: Option<&TransactionId>,
        payment_code: Option<&PaymentCode>,
    ) -> ApiResult<String>;

    /// Verifies a one-time code. On success the server associates the email
    /// with the transaction (when one is given) and the caller may treat
    /// the user as signed in.
    async fn verify_otp(
        &self,
        email: &EmailAddress,
        otp: &OtpCode,
        transaction_id: Option<&TransactionId>,
    ) -> ApiResult<()>;

    /// Binds an email obtained from a third-party identity provider to a
    /// transaction. Same downstream effect as a successful OTP cycle.
    async fn bind_identity(
        &self,
        email: &EmailAddress,
        transaction_id: &TransactionId,
    ) -> ApiResult<()>;

    /// Fetches the licenses owned by an email. An empty list is a normal
    /// answer, not an error.
    async fn licenses(&self, email: &EmailAddress) -> ApiResult<Vec<License>>;
}
