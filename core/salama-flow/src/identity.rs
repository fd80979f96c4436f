//! Identity verification after a completed payment.
//!
//! Two paths converge on a [`Session`]: the email OTP cycle (request a
//! six-digit code, verify it, with a 30 second resend cooldown), and a
//! third-party identity binding where the provider already vouched for the
//! email. The in-flight `VerificationSession` is in-memory only; dismissing
//! the flow discards it without touching the persisted transaction.

use crate::error::{FlowError, FlowResult};
use async_trait::async_trait;
use salama_api::LicenseApi;
use salama_types::{EmailAddress, OtpCode, PaymentCode, Session, TransactionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Minimum wait between OTP requests for the same session.
pub const RESEND_COOLDOWN: Duration = Duration::from_secs(30);

/// In-memory state of one OTP verification attempt. Never persisted.
///
/// Exists from the moment a code is requested; before that the cycle is
/// still waiting for an email and there is nothing to track.
#[derive(Debug, Clone)]
pub struct VerificationSession {
    /// Email the code was sent to.
    pub email: EmailAddress,
    /// Failed verification attempts so far.
    pub attempts: u32,
    resend_available_at: Instant,
}

impl VerificationSession {
    /// Time remaining until another code may be requested, or `None` if a
    /// resend is allowed now.
    #[must_use]
    pub fn resend_available_in(&self) -> Option<Duration> {
        let now = Instant::now();
        (now < self.resend_available_at).then(|| self.resend_available_at - now)
    }
}

/// Runs the email OTP cycle for one transaction.
pub struct IdentityVerifier {
    api: Arc<dyn LicenseApi>,
    transaction_id: TransactionId,
    payment_code: Option<PaymentCode>,
    session: Option<VerificationSession>,
}

impl IdentityVerifier {
    /// Creates a verifier for the given completed transaction. The payment
    /// code, when known, is forwarded with the OTP request so the server can
    /// tie the code to the purchase.
    pub fn new(
        api: Arc<dyn LicenseApi>,
        transaction_id: TransactionId,
        payment_code: Option<PaymentCode>,
    ) -> Self {
        Self {
            api,
            transaction_id,
            payment_code,
            session: None,
        }
    }

    /// The in-flight verification session, if a code has been requested.
    #[must_use]
    pub fn session(&self) -> Option<&VerificationSession> {
        self.session.as_ref()
    }

    /// Requests an OTP for `email` and moves to the code-entry step.
    ///
    /// Returns the server's acknowledgement message.
    pub async fn begin(&mut self, email: EmailAddress) -> FlowResult<String> {
        let message = self
            .api
            .request_otp(
                &email,
                Some(&self.transaction_id),
                self.payment_code.as_ref(),
            )
            .await?;
        info!(email = %email, transaction_id = %self.transaction_id, "otp requested");
        self.session = Some(VerificationSession {
            email,
            attempts: 0,
            resend_available_at: Instant::now() + RESEND_COOLDOWN,
        });
        Ok(message)
    }

    /// Requests another code for the same email.
    ///
    /// Refused locally while the cooldown is running; the server is not
    /// contacted in that case.
    pub async fn resend(&mut self) -> FlowResult<String> {
        let session = self.session.as_mut().ok_or(FlowError::InvalidState {
            action: "resend a code",
            state: "no code has been requested",
        })?;
        if let Some(remaining) = session.resend_available_in() {
            debug!("resend refused, cooldown running");
            return Err(FlowError::ResendCooldown {
                remaining_secs: remaining.as_secs().max(1),
            });
        }
        let email = session.email.clone();
        let message = self
            .api
            .request_otp(
                &email,
                Some(&self.transaction_id),
                self.payment_code.as_ref(),
            )
            .await?;
        if let Some(session) = self.session.as_mut() {
            session.resend_available_at = Instant::now() + RESEND_COOLDOWN;
        }
        Ok(message)
    }

    /// Verifies a typed code and returns the resulting signed-in session.
    ///
    /// The code must be six digits before anything is sent. A server
    /// rejection counts an attempt and leaves the session in place so the
    /// user can retype or resend.
    pub async fn verify(&mut self, otp: &str) -> FlowResult<Session> {
        let session = self.session.as_ref().ok_or(FlowError::InvalidState {
            action: "verify a code",
            state: "no code has been requested",
        })?;
        let email = session.email.clone();
        let otp = OtpCode::parse(otp)?;

        match self
            .api
            .verify_otp(&email, &otp, Some(&self.transaction_id))
            .await
        {
            Ok(()) => {
                info!(email = %email, transaction_id = %self.transaction_id, "identity verified");
                Ok(Session::new(email))
            }
            Err(e) => {
                if let Some(session) = self.session.as_mut() {
                    session.attempts += 1;
                    warn!(attempts = session.attempts, "otp verification failed");
                }
                Err(e.into())
            }
        }
    }
}

/// Binding an externally verified email to a transaction.
///
/// Used for the third-party sign-in path, and to silently associate an
/// already signed-in user's email without an OTP round trip.
#[async_trait]
pub trait IdentityBinding: Send + Sync {
    /// Associates `email` with the transaction and returns the session.
    async fn bind(
        &self,
        email: &EmailAddress,
        transaction_id: &TransactionId,
    ) -> FlowResult<Session>;
}

/// Server-backed [`IdentityBinding`].
pub struct ThirdPartyBinding {
    api: Arc<dyn LicenseApi>,
}

impl ThirdPartyBinding {
    /// Creates a binding over the given API client.
    pub fn new(api: Arc<dyn LicenseApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl IdentityBinding for ThirdPartyBinding {
    async fn bind(
        &self,
        email: &EmailAddress,
        transaction_id: &TransactionId,
    ) -> FlowResult<Session> {
        self.api.bind_identity(email, transaction_id).await?;
        info!(email = %email, %transaction_id, "identity bound");
        Ok(Session::new(email.clone()))
    }
}
