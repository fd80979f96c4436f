//! The purchase flow state machine.
//!
//! One `PurchaseFlow` drives a purchase from the entry form through payment
//! confirmation and identity verification. Every transaction mutation is
//! persisted before the in-memory state advances, so a crash or reload
//! between any two steps resumes where it left off. The persisted slot is
//! cleared only on a fully verified purchase, an explicit start-over, or
//! expiry; dismissing the flow keeps it.

use crate::error::{FlowError, FlowResult};
use crate::identity::{IdentityBinding, IdentityVerifier, ThirdPartyBinding, VerificationSession};
use crate::poller::{PollOutcome, StatusPoller};
use crate::PollConfig;
use salama_api::LicenseApi;
use salama_store::TransactionStore;
use salama_types::{
    EmailAddress, PaymentCode, PaymentConfirmation, PhoneNumber, PurchaseCode, Session,
    Transaction, TransactionStatus,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the purchase flow currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Entry form: phone number and purchase code.
    Form,
    /// Initiation request in flight.
    Submitting,
    /// Waiting for the provider to confirm payment.
    Polling,
    /// Polling timed out; the user picks recheck, manual entry or start over.
    TimeoutChoice {
        /// Whether the single recheck is still available.
        recheck_available: bool,
    },
    /// Waiting for a manually typed payment confirmation code.
    ManualCodeEntry,
    /// Payment confirmed; identity verification not started yet.
    CompletedPendingVerification,
    /// OTP or third-party verification in progress.
    VerifyingIdentity,
    /// A resumable completed purchase was found on construction.
    ResumePrompt,
    /// Purchase verified and bound to an email.
    Done,
}

impl FlowState {
    fn name(&self) -> &'static str {
        match self {
            FlowState::Form => "on the entry form",
            FlowState::Submitting => "submitting",
            FlowState::Polling => "awaiting payment",
            FlowState::TimeoutChoice { .. } => "choosing after a timeout",
            FlowState::ManualCodeEntry => "entering a payment code",
            FlowState::CompletedPendingVerification => "pending verification",
            FlowState::VerifyingIdentity => "verifying identity",
            FlowState::ResumePrompt => "deciding whether to resume",
            FlowState::Done => "done",
        }
    }
}

/// Drives one purchase from form entry to a verified license.
pub struct PurchaseFlow {
    api: Arc<dyn LicenseApi>,
    store: TransactionStore,
    current_user: Option<Session>,
    poll_config: PollConfig,
    state: FlowState,
    transaction: Option<Transaction>,
    verifier: Option<IdentityVerifier>,
    session: Option<Session>,
    recheck_used: bool,
}

impl PurchaseFlow {
    /// Creates a flow, resuming from the persisted transaction if one is
    /// still live.
    ///
    /// A completed but unverified transaction opens at the resume prompt; a
    /// pending one re-enters polling (call [`await_payment`] to restart the
    /// timers). Anything else starts at the form.
    ///
    /// `current_user` is the already signed-in session, if any; when set, a
    /// completed payment is bound to that email silently and the OTP step is
    /// skipped.
    ///
    /// [`await_payment`]: PurchaseFlow::await_payment
    pub fn new(
        api: Arc<dyn LicenseApi>,
        store: TransactionStore,
        current_user: Option<Session>,
    ) -> FlowResult<Self> {
        let transaction = store.load()?;
        let state = match &transaction {
            Some(t) if t.needs_verification() => {
                info!(transaction_id = %t.transaction_id, "resuming completed purchase");
                FlowState::ResumePrompt
            }
            Some(t) if t.awaiting_payment() => {
                info!(transaction_id = %t.transaction_id, "resuming payment wait");
                FlowState::Polling
            }
            Some(t) => {
                debug!(transaction_id = %t.transaction_id, status = ?t.status, "dropping non-resumable record");
                store.clear()?;
                FlowState::Form
            }
            None => FlowState::Form,
        };
        let transaction = if state == FlowState::Form {
            None
        } else {
            transaction
        };
        Ok(Self {
            api,
            store,
            current_user,
            poll_config: PollConfig::default(),
            state,
            transaction,
            verifier: None,
            session: None,
            recheck_used: false,
        })
    }

    /// Overrides the polling timings. Intended for tests.
    #[must_use]
    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// The in-flight transaction, if any.
    #[must_use]
    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    /// The signed-in session produced by a finished flow.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The in-flight OTP session, when identity verification is underway.
    #[must_use]
    pub fn verification(&self) -> Option<&VerificationSession> {
        self.verifier.as_ref().and_then(IdentityVerifier::session)
    }

    /// Validates the form and initiates the payment.
    ///
    /// Both inputs are checked locally first; nothing reaches the network on
    /// a validation failure and the state does not move. On success the
    /// transaction is persisted and the flow enters polling.
    pub async fn submit(&mut self, phone: &str, purchase_code: &str) -> FlowResult<()> {
        self.expect("submit the form", matches!(self.state, FlowState::Form))?;
        let phone = PhoneNumber::parse(phone)?;
        let purchase_code = PurchaseCode::parse(purchase_code)?;

        self.state = FlowState::Submitting;
        match self.api.initiate_purchase(&phone, &purchase_code).await {
            Ok(initiated) => {
                let transaction =
                    Transaction::new(initiated.transaction_id, initiated.checkout_request_id);
                self.store.save(&transaction)?;
                info!(transaction_id = %transaction.transaction_id, "purchase initiated");
                self.transaction = Some(transaction);
                self.state = FlowState::Polling;
                Ok(())
            }
            Err(e) => {
                warn!("purchase initiation failed: {e}");
                self.state = FlowState::Form;
                Err(e.into())
            }
        }
    }

    /// Polls for payment confirmation until completion or the deadline.
    ///
    /// Dropping the returned future cancels the timers without losing the
    /// persisted transaction; a later call restarts the full polling window.
    pub async fn await_payment(&mut self) -> FlowResult<FlowState> {
        self.expect("await payment", matches!(self.state, FlowState::Polling))?;
        let mut transaction = self.current_transaction()?;
        if transaction.status == TransactionStatus::Pending {
            transaction.status = TransactionStatus::Processing;
            self.store.save(&transaction)?;
            self.transaction = Some(transaction.clone());
        }

        let poller = StatusPoller::with_config(self.api.clone(), self.poll_config);
        let outcome = poller
            .run(
                &transaction.transaction_id,
                transaction.checkout_request_id.as_ref(),
            )
            .await;
        match outcome {
            PollOutcome::Completed(confirmation) => {
                self.complete_payment(confirmation).await?;
            }
            PollOutcome::TimedOut => {
                self.state = FlowState::TimeoutChoice {
                    recheck_available: !self.recheck_used,
                };
            }
        }
        Ok(self.state.clone())
    }

    /// Re-enters polling after a timeout. Available once per flow.
    pub async fn recheck(&mut self) -> FlowResult<FlowState> {
        self.expect(
            "recheck payment status",
            matches!(
                self.state,
                FlowState::TimeoutChoice {
                    recheck_available: true
                }
            ),
        )?;
        self.recheck_used = true;
        self.state = FlowState::Polling;
        self.await_payment().await
    }

    /// Switches from the timeout choice to manual code entry.
    pub fn choose_manual_entry(&mut self) -> FlowResult<()> {
        self.expect(
            "enter a payment code",
            matches!(self.state, FlowState::TimeoutChoice { .. }),
        )?;
        self.state = FlowState::ManualCodeEntry;
        Ok(())
    }

    /// Returns from manual entry to the timeout choice.
    pub fn back_to_choices(&mut self) -> FlowResult<()> {
        self.expect(
            "go back",
            matches!(self.state, FlowState::ManualCodeEntry),
        )?;
        self.state = FlowState::TimeoutChoice {
            recheck_available: !self.recheck_used,
        };
        Ok(())
    }

    /// Verifies a manually typed payment confirmation code.
    ///
    /// The code is normalized and format-checked before submission. A server
    /// rejection leaves the flow in manual entry with the server's message.
    pub async fn submit_payment_code(&mut self, code: &str) -> FlowResult<FlowState> {
        self.expect(
            "verify a payment code",
            matches!(self.state, FlowState::ManualCodeEntry),
        )?;
        let code = PaymentCode::parse(code)?;
        let transaction = self.current_transaction()?;

        let mut confirmation = self
            .api
            .verify_payment_code(&transaction.transaction_id, &code)
            .await?;
        confirmation.mpesa_receipt.get_or_insert(code);
        self.complete_payment(confirmation).await?;
        Ok(self.state.clone())
    }

    /// Opens identity verification for a confirmed payment.
    pub fn begin_verification(&mut self) -> FlowResult<()> {
        self.expect(
            "verify identity",
            matches!(self.state, FlowState::CompletedPendingVerification),
        )?;
        self.open_verifier()
    }

    /// Submits the user's email and requests an OTP.
    pub async fn submit_email(&mut self, email: &str) -> FlowResult<String> {
        self.expect(
            "request a code",
            matches!(self.state, FlowState::VerifyingIdentity),
        )?;
        let email = EmailAddress::parse(email)?;
        self.verifier_mut()?.begin(email).await
    }

    /// Requests another OTP for the same email, subject to the cooldown.
    pub async fn resend_code(&mut self) -> FlowResult<String> {
        self.expect(
            "resend a code",
            matches!(self.state, FlowState::VerifyingIdentity),
        )?;
        self.verifier_mut()?.resend().await
    }

    /// Verifies a typed OTP; on success the purchase is complete.
    pub async fn submit_otp(&mut self, otp: &str) -> FlowResult<FlowState> {
        self.expect(
            "verify a code",
            matches!(self.state, FlowState::VerifyingIdentity),
        )?;
        let session = self.verifier_mut()?.verify(otp).await?;
        self.finish(session)?;
        Ok(self.state.clone())
    }

    /// Completes verification with an email vouched for by a third-party
    /// identity provider. No OTP cycle.
    pub async fn bind_third_party(&mut self, email: &str) -> FlowResult<FlowState> {
        self.expect(
            "bind an identity",
            matches!(
                self.state,
                FlowState::VerifyingIdentity | FlowState::CompletedPendingVerification
            ),
        )?;
        let email = EmailAddress::parse(email)?;
        let transaction = self.current_transaction()?;
        let session = ThirdPartyBinding::new(self.api.clone())
            .bind(&email, &transaction.transaction_id)
            .await?;
        self.finish(session)?;
        Ok(self.state.clone())
    }

    /// Continues a resumed purchase into identity verification.
    pub fn continue_purchase(&mut self) -> FlowResult<()> {
        self.expect(
            "continue the purchase",
            matches!(self.state, FlowState::ResumePrompt),
        )?;
        self.open_verifier()
    }

    /// Discards the purchase from the resume prompt or the timeout choice
    /// and returns to the form.
    pub fn start_over(&mut self) -> FlowResult<()> {
        self.expect(
            "start over",
            matches!(self.state, FlowState::ResumePrompt | FlowState::TimeoutChoice { .. }),
        )?;
        self.abandon()
    }

    /// Explicitly abandons the purchase, clearing the persisted slot.
    pub fn abandon(&mut self) -> FlowResult<()> {
        self.store.clear()?;
        self.transaction = None;
        self.verifier = None;
        self.state = FlowState::Form;
        Ok(())
    }

    /// Dismisses the flow without abandoning: the persisted transaction
    /// survives, so a new flow over the same store resumes it. Any running
    /// timers die with the dropped futures.
    pub fn close(self) {}

    // Marks the payment confirmed, persists it, then either hands off to
    // identity verification or silently binds the signed-in user.
    async fn complete_payment(&mut self, confirmation: PaymentConfirmation) -> FlowResult<()> {
        let mut transaction = self.current_transaction()?;
        transaction.status = TransactionStatus::Completed;
        if transaction.payment_code.is_none() {
            transaction.payment_code = confirmation.mpesa_receipt.clone();
        }
        self.store.save(&transaction)?;
        self.transaction = Some(transaction.clone());
        self.state = FlowState::CompletedPendingVerification;

        if let Some(user) = self.current_user.clone() {
            // Already signed in: associate their email without an OTP. A
            // failure here is recoverable; the flow stays pending
            // verification and the user can verify manually.
            let session = ThirdPartyBinding::new(self.api.clone())
                .bind(&user.email, &transaction.transaction_id)
                .await?;
            self.finish(session)?;
        }
        Ok(())
    }

    fn open_verifier(&mut self) -> FlowResult<()> {
        let transaction = self.current_transaction()?;
        self.verifier = Some(IdentityVerifier::new(
            self.api.clone(),
            transaction.transaction_id,
            transaction.payment_code,
        ));
        self.state = FlowState::VerifyingIdentity;
        Ok(())
    }

    fn finish(&mut self, session: Session) -> FlowResult<()> {
        self.store.clear()?;
        self.verifier = None;
        self.session = Some(session);
        self.state = FlowState::Done;
        Ok(())
    }

    fn verifier_mut(&mut self) -> FlowResult<&mut IdentityVerifier> {
        self.verifier.as_mut().ok_or(FlowError::InvalidState {
            action: "verify identity",
            state: "verification is not open",
        })
    }

    fn current_transaction(&self) -> FlowResult<Transaction> {
        self.transaction.clone().ok_or(FlowError::InvalidState {
            action: "continue",
            state: "no transaction is in flight",
        })
    }

    fn expect(&self, action: &'static str, ok: bool) -> FlowResult<()> {
        if ok {
            Ok(())
        } else {
            Err(FlowError::InvalidState {
                action,
                state: self.state.name(),
            })
        }
    }
}
