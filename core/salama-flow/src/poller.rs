//! Transaction status polling.
//!
//! After a payment is initiated the provider confirms it asynchronously, so
//! the flow polls `transaction-status` every 2.5 seconds for up to a minute.
//! Both timers live in one task: cancelling the task (or dropping the
//! future) tears the interval and the deadline down together, so a dismissed
//! purchase can never leave a timer running.

use crate::PollConfig;
use salama_api::LicenseApi;
use salama_types::{CheckoutRequestId, PaymentConfirmation, TransactionId, TransactionStatus};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tracing::{debug, info};

/// How one polling run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The server reported the payment COMPLETED.
    Completed(PaymentConfirmation),
    /// The deadline passed without a completed payment. Not an error; the
    /// flow offers a recheck or manual code entry next.
    TimedOut,
}

/// Polls a transaction's status until completion or deadline.
pub struct StatusPoller {
    api: Arc<dyn LicenseApi>,
    config: PollConfig,
}

impl StatusPoller {
    /// Creates a poller with the default 2.5s interval and 60s deadline.
    pub fn new(api: Arc<dyn LicenseApi>) -> Self {
        Self::with_config(api, PollConfig::default())
    }

    /// Creates a poller with explicit timings.
    pub fn with_config(api: Arc<dyn LicenseApi>, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Runs one polling cycle to its outcome.
    ///
    /// The first query fires immediately, then every `interval` until the
    /// deadline. Failed queries are transient and do not end the run; any
    /// status other than COMPLETED keeps polling. Dropping the returned
    /// future cancels both timers.
    pub async fn run(
        &self,
        transaction_id: &TransactionId,
        checkout_request_id: Option<&CheckoutRequestId>,
    ) -> PollOutcome {
        let deadline = sleep_until(Instant::now() + self.config.deadline);
        tokio::pin!(deadline);
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = &mut deadline => {
                    debug!(%transaction_id, "polling deadline reached");
                    return PollOutcome::TimedOut;
                }
                _ = ticker.tick() => {
                    match self.api.transaction_status(transaction_id, checkout_request_id).await {
                        Ok(report) if report.status == TransactionStatus::Completed => {
                            info!(%transaction_id, "payment completed");
                            return PollOutcome::Completed(report.confirmation);
                        }
                        Ok(report) => {
                            debug!(%transaction_id, status = ?report.status, "payment not completed yet");
                        }
                        Err(e) => {
                            debug!(%transaction_id, "status query failed, will retry: {e}");
                        }
                    }
                }
            }
        }
    }
}

/// Control handle for a background polling task.
///
/// Dropping the handle stops the task.
pub struct PollerHandle {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<Option<PollOutcome>>>,
}

impl PollerHandle {
    /// Spawns polling as a background task.
    pub fn spawn(
        api: Arc<dyn LicenseApi>,
        config: PollConfig,
        transaction_id: TransactionId,
        checkout_request_id: Option<CheckoutRequestId>,
    ) -> Self {
        let (stop, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let poller = StatusPoller::with_config(api, config);
            tokio::select! {
                outcome = poller.run(&transaction_id, checkout_request_id.as_ref()) => Some(outcome),
                _ = stopped.wait_for(|&s| s) => None,
            }
        });
        Self {
            stop,
            task: Some(task),
        }
    }

    /// Stops the task. Safe to call more than once.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Waits for the task and returns its outcome, or `None` if it was
    /// stopped before resolving.
    pub async fn outcome(mut self) -> Option<PollOutcome> {
        match self.task.take() {
            Some(task) => task.await.unwrap_or(None),
            None => None,
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}
