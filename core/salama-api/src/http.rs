//! `reqwest`-backed implementation of [`LicenseApi`].

use crate::client::{LicenseApi, PurchaseInitiated, TransactionStatusReport};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use salama_types::{
    CheckoutRequestId, EmailAddress, License, OtpCode, PaymentCode, PaymentConfirmation,
    PhoneNumber, PurchaseCode, TransactionId, TransactionStatus,
};
use tracing::{debug, warn};

const PATH_INITIATE: &str = "/initiate-purchase";
const PATH_STATUS: &str = "/transaction-status";
const PATH_VERIFY_CODE: &str = "/verify-payment-code";
const PATH_REQUEST_OTP: &str = "/request-otp";
const PATH_VERIFY_OTP: &str = "/verify-otp";
const PATH_BIND_IDENTITY: &str = "/bind-third-party-identity";
const PATH_LICENSES: &str = "/licenses";

/// Fallback shown when the server rejects an operation without a message.
const GENERIC_REJECTION: &str = "The request was rejected by the server. Please try again.";

// Wire shapes. Every response carries a top-level `status` discriminator;
// a missing discriminator on a 2xx is treated as success.

#[derive(Debug, Deserialize)]
struct InitiateResponse {
    status: Option<String>,
    message: Option<String>,
    transaction_id: Option<String>,
    checkout_request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: Option<String>,
    message: Option<String>,
    transaction_status: Option<String>,
    mpesa_receipt: Option<String>,
    user_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyCodeResponse {
    status: Option<String>,
    message: Option<String>,
    transaction_status: Option<String>,
    mpesa_receipt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckResponse {
    status: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LicensesResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    data: Vec<License>,
}

/// Envelope used when fishing a business message out of an error body.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

/// HTTP client for the license API.
pub struct HttpLicenseApi {
    config: ApiConfig,
    client: Client,
}

impl HttpLicenseApi {
    /// Creates a client from the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying TLS backend cannot be initialized.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("failed to create HTTP client");
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Attaches the static service credential.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.config.api_token.is_empty() {
            builder
        } else {
            builder.header("Authorization", format!("token {}", self.config.api_token))
        }
    }

    /// Maps a non-2xx response to an error, preferring the server's own
    /// business message when the body carries one. A 5xx is always a
    /// retryable server error, whatever its body says.
    async fn error_from(response: Response) -> ApiError {
        let http_status = response.status();
        let status = http_status.as_u16();
        let body = response.text().await.unwrap_or_default();
        if !http_status.is_server_error() {
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
                if let Some(message) = envelope.message {
                    return ApiError::Rejected { message };
                }
            }
        }
        ApiError::Server {
            status,
            message: if body.is_empty() {
                "no response body".to_string()
            } else {
                body
            },
        }
    }

    /// Decodes a 2xx body, mapping JSON shape problems to `InvalidResponse`.
    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> ApiResult<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Checks the top-level `status` discriminator.
fn check_discriminator(status: Option<&str>, message: Option<&String>) -> ApiResult<()> {
    match status {
        None | Some("success") => Ok(()),
        Some(_) => Err(ApiError::Rejected {
            message: message.cloned().unwrap_or_else(|| GENERIC_REJECTION.to_string()),
        }),
    }
}

/// Parses a server receipt string, tolerating the occasional malformed one.
fn parse_receipt(raw: Option<String>) -> Option<PaymentCode> {
    let raw = raw?;
    match PaymentCode::parse(&raw) {
        Ok(code) => Some(code),
        Err(_) => {
            warn!("server returned unparseable receipt: {raw:?}");
            None
        }
    }
}

#[async_trait]
impl LicenseApi for HttpLicenseApi {
    async fn initiate_purchase(
        &self,
        phone: &PhoneNumber,
        purchase_code: &PurchaseCode,
    ) -> ApiResult<PurchaseInitiated> {
        debug!(phone = %phone, "initiating purchase");
        let response = self
            .authorized(self.client.post(self.url(PATH_INITIATE)))
            .json(&json!({
                "phone_number": phone.as_str(),
                "purchase_code": purchase_code.as_str(),
            }))
            .send()
            .await?;

        let raw: InitiateResponse = Self::decode(response).await?;
        check_discriminator(raw.status.as_deref(), raw.message.as_ref())?;

        let transaction_id = raw
            .transaction_id
            .ok_or_else(|| ApiError::InvalidResponse("missing transaction_id".to_string()))?;

        Ok(PurchaseInitiated {
            transaction_id: TransactionId::new(transaction_id),
            checkout_request_id: raw.checkout_request_id.map(CheckoutRequestId::new),
        })
    }

    async fn transaction_status(
        &self,
        transaction_id: &TransactionId,
        checkout_request_id: Option<&CheckoutRequestId>,
    ) -> ApiResult<TransactionStatusReport> {
        let mut query = vec![("transaction_id", transaction_id.as_str().to_string())];
        if let Some(checkout) = checkout_request_id {
            query.push(("checkout_request_id", checkout.as_str().to_string()));
        }

        let response = self
            .authorized(self.client.get(self.url(PATH_STATUS)))
            .query(&query)
            .send()
            .await?;

        let raw: StatusResponse = Self::decode(response).await?;
        check_discriminator(raw.status.as_deref(), raw.message.as_ref())?;

        let status_value = raw
            .transaction_status
            .ok_or_else(|| ApiError::InvalidResponse("missing transaction_status".to_string()))?;
        let status = TransactionStatus::from_api_value(&status_value).ok_or_else(|| {
            ApiError::InvalidResponse(format!("unknown transaction_status: {status_value:?}"))
        })?;

        Ok(TransactionStatusReport {
            status,
            confirmation: PaymentConfirmation {
                mpesa_receipt: parse_receipt(raw.mpesa_receipt),
                user_email: raw.user_email,
            },
        })
    }

    async fn verify_payment_code(
        &self,
        transaction_id: &TransactionId,
        payment_code: &PaymentCode,
    ) -> ApiResult<PaymentConfirmation> {
        debug!(transaction_id = %transaction_id, "verifying payment code");
        let response = self
            .authorized(self.client.post(self.url(PATH_VERIFY_CODE)))
            .json(&json!({
                "transaction_id": transaction_id.as_str(),
                "payment_code": payment_code.as_str(),
            }))
            .send()
            .await?;

        let raw: VerifyCodeResponse = Self::decode(response).await?;
        check_discriminator(raw.status.as_deref(), raw.message.as_ref())?;

        // A success envelope whose transaction is not actually completed is
        // still a rejection (wrong code, code already used).
        let completed = raw
            .transaction_status
            .as_deref()
            .and_then(TransactionStatus::from_api_value)
            == Some(TransactionStatus::Completed);
        if !completed {
            return Err(ApiError::Rejected {
                message: raw.message.unwrap_or_else(|| {
                    "Payment verification failed. Please check the code and try again.".to_string()
                }),
            });
        }

        Ok(PaymentConfirmation {
            mpesa_receipt: parse_receipt(raw.mpesa_receipt),
            user_email: None,
        })
    }

    async fn request_otp(
        &self,
        email: &EmailAddress,
        transaction_id: Option<&TransactionId>,
        payment_code: Option<&PaymentCode>,
    ) -> ApiResult<String> {
        debug!(email = %email, "requesting one-time code");
        let mut body = serde_json::Map::new();
        body.insert("email".to_string(), json!(email.as_str()));
        if let Some(txn) = transaction_id {
            body.insert("transaction_id".to_string(), json!(txn.as_str()));
        }
        if let Some(code) = payment_code {
            body.insert("payment_code".to_string(), json!(code.as_str()));
        }

        let response = self
            .authorized(self.client.post(self.url(PATH_REQUEST_OTP)))
            .json(&body)
            .send()
            .await?;

        let raw: AckResponse = Self::decode(response).await?;
        check_discriminator(raw.status.as_deref(), raw.message.as_ref())?;
        Ok(raw
            .message
            .unwrap_or_else(|| "A verification code has been sent to your email.".to_string()))
    }

    async fn verify_otp(
        &self,
        email: &EmailAddress,
        otp: &OtpCode,
        transaction_id: Option<&TransactionId>,
    ) -> ApiResult<()> {
        debug!(email = %email, "verifying one-time code");
        let mut body = serde_json::Map::new();
        body.insert("email".to_string(), json!(email.as_str()));
        body.insert("otp".to_string(), json!(otp.as_str()));
        if let Some(txn) = transaction_id {
            body.insert("transaction_id".to_string(), json!(txn.as_str()));
        }

        let response = self
            .authorized(self.client.post(self.url(PATH_VERIFY_OTP)))
            .json(&body)
            .send()
            .await?;

        let raw: AckResponse = Self::decode(response).await?;
        check_discriminator(raw.status.as_deref(), raw.message.as_ref())
    }

    async fn bind_identity(
        &self,
        email: &EmailAddress,
        transaction_id: &TransactionId,
    ) -> ApiResult<()> {
        debug!(email = %email, transaction_id = %transaction_id, "binding identity");
        let response = self
            .authorized(self.client.post(self.url(PATH_BIND_IDENTITY)))
            .json(&json!({
                "email": email.as_str(),
                "transaction_id": transaction_id.as_str(),
            }))
            .send()
            .await?;

        let raw: AckResponse = Self::decode(response).await?;
        check_discriminator(raw.status.as_deref(), raw.message.as_ref())
    }

    async fn licenses(&self, email: &EmailAddress) -> ApiResult<Vec<License>> {
        let response = self
            .authorized(self.client.get(self.url(PATH_LICENSES)))
            .query(&[("user_email", email.as_str())])
            .send()
            .await?;

        let raw: LicensesResponse = Self::decode(response).await?;
        check_discriminator(raw.status.as_deref(), raw.message.as_ref())?;
        Ok(raw.data)
    }
}
