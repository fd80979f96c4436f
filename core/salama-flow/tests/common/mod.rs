//! A scripted `LicenseApi` for driving the flow without a server.
//!
//! Responses are queued per endpoint; when a queue runs dry the endpoint
//! falls back to a neutral answer (status PROCESSING, code rejected), which
//! keeps timeout tests from needing sixty scripted entries.

#![allow(dead_code)]

use async_trait::async_trait;
use salama_api::{ApiError, ApiResult, LicenseApi, PurchaseInitiated, TransactionStatusReport};
use salama_types::{
    CheckoutRequestId, EmailAddress, License, OtpCode, PaymentCode, PaymentConfirmation,
    PhoneNumber, PurchaseCode, TransactionId, TransactionStatus,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

enum ScriptedStatus {
    Status(TransactionStatus),
    Completed(PaymentConfirmation),
    Transient,
}

pub struct ScriptedApi {
    initiate_rejection: Mutex<Option<String>>,
    statuses: Mutex<VecDeque<ScriptedStatus>>,
    code_results: Mutex<VecDeque<Result<PaymentConfirmation, String>>>,
    accepted_otp: String,
    bind_rejection: Mutex<Option<String>>,

    pub initiate_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub verify_code_calls: AtomicUsize,
    pub request_otp_calls: AtomicUsize,
    pub verify_otp_calls: AtomicUsize,
    pub bind_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            initiate_rejection: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            code_results: Mutex::new(VecDeque::new()),
            accepted_otp: "123456".to_string(),
            bind_rejection: Mutex::new(None),
            initiate_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            verify_code_calls: AtomicUsize::new(0),
            request_otp_calls: AtomicUsize::new(0),
            verify_otp_calls: AtomicUsize::new(0),
            bind_calls: AtomicUsize::new(0),
        }
    }

    /// Makes the next initiation attempt fail with a business rejection.
    pub fn reject_initiation(&self, message: &str) {
        *self.initiate_rejection.lock().unwrap() = Some(message.to_string());
    }

    /// Queues one status observation.
    pub fn push_status(&self, status: TransactionStatus) {
        self.statuses
            .lock()
            .unwrap()
            .push_back(ScriptedStatus::Status(status));
    }

    /// Queues a COMPLETED observation carrying the given receipt.
    pub fn push_completed(&self, receipt: &str) {
        self.statuses
            .lock()
            .unwrap()
            .push_back(ScriptedStatus::Completed(PaymentConfirmation {
                mpesa_receipt: PaymentCode::parse(receipt).ok(),
                user_email: None,
            }));
    }

    /// Queues one transient (5xx) status failure.
    pub fn push_transient(&self) {
        self.statuses
            .lock()
            .unwrap()
            .push_back(ScriptedStatus::Transient);
    }

    /// Queues an acceptance for the next manual code verification.
    pub fn accept_code(&self, confirmation: PaymentConfirmation) {
        self.code_results.lock().unwrap().push_back(Ok(confirmation));
    }

    /// Queues a rejection for the next manual code verification.
    pub fn reject_code(&self, message: &str) {
        self.code_results
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Makes identity binding fail with a business rejection.
    pub fn reject_bind(&self, message: &str) {
        *self.bind_rejection.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl LicenseApi for ScriptedApi {
    async fn initiate_purchase(
        &self,
        _phone: &PhoneNumber,
        _purchase_code: &PurchaseCode,
    ) -> ApiResult<PurchaseInitiated> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.initiate_rejection.lock().unwrap().clone() {
            return Err(ApiError::Rejected { message });
        }
        Ok(PurchaseInitiated {
            transaction_id: TransactionId::from("TXN-5001"),
            checkout_request_id: Some(CheckoutRequestId::from("ws_CO_5001")),
        })
    }

    async fn transaction_status(
        &self,
        _transaction_id: &TransactionId,
        _checkout_request_id: Option<&CheckoutRequestId>,
    ) -> ApiResult<TransactionStatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        match self.statuses.lock().unwrap().pop_front() {
            Some(ScriptedStatus::Status(status)) => Ok(TransactionStatusReport {
                status,
                confirmation: PaymentConfirmation::default(),
            }),
            Some(ScriptedStatus::Completed(confirmation)) => Ok(TransactionStatusReport {
                status: TransactionStatus::Completed,
                confirmation,
            }),
            Some(ScriptedStatus::Transient) => Err(ApiError::Server {
                status: 503,
                message: "upstream timeout".to_string(),
            }),
            None => Ok(TransactionStatusReport {
                status: TransactionStatus::Processing,
                confirmation: PaymentConfirmation::default(),
            }),
        }
    }

    async fn verify_payment_code(
        &self,
        _transaction_id: &TransactionId,
        _payment_code: &PaymentCode,
    ) -> ApiResult<PaymentConfirmation> {
        self.verify_code_calls.fetch_add(1, Ordering::SeqCst);
        match self.code_results.lock().unwrap().pop_front() {
            Some(Ok(confirmation)) => Ok(confirmation),
            Some(Err(message)) => Err(ApiError::Rejected { message }),
            None => Err(ApiError::Rejected {
                message: "Payment not found".to_string(),
            }),
        }
    }

    async fn request_otp(
        &self,
        _email: &EmailAddress,
        _transaction_id: Option<&TransactionId>,
        _payment_code: Option<&PaymentCode>,
    ) -> ApiResult<String> {
        self.request_otp_calls.fetch_add(1, Ordering::SeqCst);
        Ok("OTP sent to your email".to_string())
    }

    async fn verify_otp(
        &self,
        _email: &EmailAddress,
        otp: &OtpCode,
        _transaction_id: Option<&TransactionId>,
    ) -> ApiResult<()> {
        self.verify_otp_calls.fetch_add(1, Ordering::SeqCst);
        if otp.as_str() == self.accepted_otp {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: "Invalid OTP".to_string(),
            })
        }
    }

    async fn bind_identity(
        &self,
        _email: &EmailAddress,
        _transaction_id: &TransactionId,
    ) -> ApiResult<()> {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.bind_rejection.lock().unwrap().clone() {
            return Err(ApiError::Rejected { message });
        }
        Ok(())
    }

    async fn licenses(&self, _email: &EmailAddress) -> ApiResult<Vec<License>> {
        Ok(Vec::new())
    }
}
