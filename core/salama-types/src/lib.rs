//! Core type definitions for the Salama license portal.
//!
//! Everything here is plain data: identifiers handed out by the license
//! server, validated user input (phone numbers, purchase and payment codes,
//! OTPs, emails), the purchase `Transaction` record, the read-only `License`
//! model, and the signed-in `Session`. No I/O lives in this crate.

mod codes;
mod ids;
mod license;
mod session;
mod transaction;

pub use codes::{EmailAddress, OtpCode, PaymentCode, PhoneNumber, PurchaseCode, ValidationError};
pub use ids::{CheckoutRequestId, TransactionId};
pub use license::{License, LicensePaymentDetails, LicenseState};
pub use session::Session;
pub use transaction::{PaymentConfirmation, Transaction, TransactionStatus, TRANSACTION_TTL_HOURS};
