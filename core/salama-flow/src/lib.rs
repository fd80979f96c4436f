//! Purchase orchestration for the Salama license portal.
//!
//! This crate owns the purchase state machine: a user submits a phone
//! number and purchase code, the provider pushes a mobile-money prompt, and
//! the flow polls for confirmation, falls back to manual code entry on a
//! timeout, and finishes with identity verification so the license lands on
//! the right email.
//!
//! The pieces:
//! - [`PurchaseFlow`] drives the whole thing and persists progress through
//!   a [`TransactionStore`](salama_store::TransactionStore) so an
//!   interrupted purchase resumes after a reload.
//! - [`StatusPoller`] waits for the provider to confirm payment.
//! - [`IdentityVerifier`] runs the email OTP cycle;
//!   [`ThirdPartyBinding`] covers externally verified identities.

mod error;
mod identity;
mod orchestrator;
mod poller;

pub use error::{FlowError, FlowResult};
pub use identity::{
    IdentityBinding, IdentityVerifier, ThirdPartyBinding, VerificationSession, RESEND_COOLDOWN,
};
pub use orchestrator::{FlowState, PurchaseFlow};
pub use poller::{PollOutcome, PollerHandle, StatusPoller};

use std::time::Duration;

/// Timing for one payment polling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between status queries.
    pub interval: Duration,
    /// Overall deadline for the window.
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2500),
            deadline: Duration::from_secs(60),
        }
    }
}
