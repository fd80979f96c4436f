//! HTTP client for the Salama license purchase API.
//!
//! The portal core talks to one external REST API for everything with side
//! effects: initiating a mobile-money payment, checking transaction status,
//! verifying a manually entered payment code, the email OTP cycle, binding a
//! third-party identity, and fetching licenses.
//!
//! The seam is the [`LicenseApi`] trait; [`HttpLicenseApi`] is the
//! `reqwest`-backed implementation. Flow logic depends on the trait so it
//! can be driven by a scripted implementation in tests.
//!
//! Every response carries a top-level `status` discriminator. Anything
//! other than `"success"` is surfaced as [`ApiError::Rejected`] with the
//! server's own message when it provides one.

mod client;
mod config;
mod error;
mod http;

pub use client::{LicenseApi, PurchaseInitiated, TransactionStatusReport};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use http::HttpLicenseApi;
