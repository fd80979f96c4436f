//! The license entitlement model.
//!
//! Licenses are owned entirely by the server; this side only displays what
//! the API returns. Field names mirror the wire format.

use serde::{Deserialize, Serialize};

/// Server-reported license state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseState {
    Active,
    Expired,
    Pending,
}

/// Payment details attached to a license by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicensePaymentDetails {
    /// Phone number the payment was made from.
    pub phone_number: Option<String>,
    /// Provider receipt code.
    pub mpesa_receipt: Option<String>,
    /// Payment date, as formatted by the server.
    pub date: Option<String>,
    /// Amount paid.
    pub amount: Option<f64>,
    /// Media profile the license covers.
    pub media_profile: Option<String>,
}

/// A product entitlement returned by the server once a transaction is
/// associated with a verified email. Read-only on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    /// Full license key.
    pub license_key: String,
    /// Server-masked form of the key for display.
    #[serde(default)]
    pub masked_license_key: Option<String>,
    /// Current state of the entitlement.
    pub status: LicenseState,
    /// Payment the license was issued against.
    #[serde(default)]
    pub payment_details: LicensePaymentDetails,
    /// Email the license is bound to.
    pub user_email: String,
}
