//! Subscription and payment endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{decode, ApiClient};
use crate::error::GatewayError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerification {
    #[serde(default)]
    pub message: String,
    pub subscription_status: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub subscription_status: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationResult {
    #[serde(default)]
    pub message: String,
    pub subscription_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub reference: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub payment_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentHistoryBody {
    #[serde(default)]
    payments: Vec<PaymentRecord>,
}

impl ApiClient {
    /// `POST /api/payment/verify-payment` after the checkout widget reports
    /// success for `reference`.
    ///
    /// # Errors
    /// A transport failure is [`GatewayError::Network`] or
    /// [`GatewayError::Timeout`]. Any backend rejection is
    /// [`GatewayError::PaymentVerification`]: the charge may have gone
    /// through, so the caller must not retry and should point the user at
    /// support.
    pub async fn verify_payment(&self, reference: &str) -> Result<PaymentVerification, GatewayError> {
        const ENDPOINT: &str = "api/payment/verify-payment";
        let body = json!({ "reference": reference });
        let raw = self.send_raw(Method::POST, ENDPOINT, &[], Some(&body)).await?;
        if !raw.status.is_success() {
            let message = raw.error_message();
            tracing::warn!(reference, status = raw.status.as_u16(), %message, "payment verification rejected");
            return Err(GatewayError::PaymentVerification {
                reference: reference.to_string(),
                message,
            });
        }
        decode(ENDPOINT, raw.body)
    }

    /// `GET /api/payment/subscription-status`.
    pub async fn subscription_status(&self) -> Result<SubscriptionStatus, GatewayError> {
        self.request(Method::GET, "api/payment/subscription-status", &[], None)
            .await
    }

    /// `POST /api/payment/cancel-subscription`.
    pub async fn cancel_subscription(&self) -> Result<CancellationResult, GatewayError> {
        self.request(Method::POST, "api/payment/cancel-subscription", &[], None)
            .await
    }

    /// `GET /api/payment/payment-history`, newest first.
    pub async fn payment_history(&self) -> Result<Vec<PaymentRecord>, GatewayError> {
        let body: PaymentHistoryBody = self
            .request(Method::GET, "api/payment/payment-history", &[], None)
            .await?;
        Ok(body.payments)
    }
}
