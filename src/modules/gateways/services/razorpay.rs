use super::gateway_trait::{
    GatewayRefundStatus, RefundEvent, RefundGateway, RefundRequest, RefundResponse,
};
use crate::config::GatewayConfig;
use crate::core::{AppError, Currency, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// Razorpay refunds client
///
/// API Documentation: https://razorpay.com/docs/api/refunds/
pub struct RazorpayClient {
    client: Client,
    key_id: String,
    key_secret: String,
    webhook_secret: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayRefund {
    id: String,
    #[serde(default)]
    payment_id: Option<String>,
    amount: i64,
    #[serde(default)]
    currency: Option<String>,
    status: String,
    #[serde(default)]
    notes: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    event: String,
    #[serde(default)]
    payload: HashMap<String, WebhookEntity>,
}

#[derive(Debug, Deserialize)]
struct WebhookEntity {
    entity: serde_json::Value,
}

impl RazorpayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            webhook_secret: config.webhook_secret.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn map_status(status: &str) -> GatewayRefundStatus {
        match status {
            "processed" => GatewayRefundStatus::Processed,
            "failed" => GatewayRefundStatus::Failed,
            _ => GatewayRefundStatus::Pending,
        }
    }

    fn currency_of(refund: &RazorpayRefund) -> Currency {
        refund
            .currency
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RefundGateway for RazorpayClient {
    async fn create_refund(&self, request: RefundRequest) -> Result<RefundResponse> {
        let url = format!(
            "{}/v1/payments/{}/refund",
            self.base_url, request.payment_id
        );

        // Razorpay expects the smallest currency unit (paise)
        let amount = request.currency.to_minor_units(request.amount)?;
        if amount <= 0 {
            return Err(AppError::validation("Refund amount must be positive"));
        }

        let body = json!({
            "amount": amount,
            "speed": "normal",
            "notes": {
                "booking_id": request.booking_id,
                "reason": request.reason,
            },
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    AppError::gateway(format!(
                        "Razorpay gateway unavailable: {} ({})",
                        if e.is_timeout() {
                            "timeout"
                        } else {
                            "connection failed"
                        },
                        e
                    ))
                } else {
                    AppError::gateway(format!("Razorpay API request failed: {}", e))
                }
            })?;

        let status_code = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| AppError::gateway(format!("Failed to read Razorpay response: {}", e)))?;

        if !status_code.is_success() {
            let detail = serde_json::from_str::<RazorpayErrorBody>(&response_body)
                .ok()
                .map(|b| {
                    format!(
                        "{}: {}",
                        b.error.code.unwrap_or_else(|| "ERROR".to_string()),
                        b.error.description.unwrap_or_default()
                    )
                })
                .unwrap_or(response_body);

            return Err(AppError::gateway(format!(
                "Razorpay refund failed with status {}: {}",
                status_code.as_u16(),
                detail
            )));
        }

        let raw_response: serde_json::Value = serde_json::from_str(&response_body)
            .map_err(|e| AppError::gateway(format!("Invalid Razorpay response: {}", e)))?;
        let refund: RazorpayRefund = serde_json::from_value(raw_response.clone())
            .map_err(|e| AppError::gateway(format!("Unexpected Razorpay refund payload: {}", e)))?;

        Ok(RefundResponse {
            status: Self::map_status(&refund.status),
            amount: Self::currency_of(&refund).from_minor_units(refund.amount),
            refund_id: refund.id,
            raw_response,
        })
    }

    fn verify_webhook(&self, signature: &str, payload: &[u8]) -> Result<bool> {
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::Configuration("Invalid Razorpay webhook secret".to_string()))?;
        mac.update(payload);

        let Ok(provided) = hex::decode(signature.trim()) else {
            return Ok(false);
        };

        // verify_slice compares in constant time
        Ok(mac.verify_slice(&provided).is_ok())
    }

    fn parse_refund_event(&self, payload: &[u8]) -> Result<Option<RefundEvent>> {
        let envelope: WebhookEnvelope = serde_json::from_slice(payload)?;

        let status = match envelope.event.as_str() {
            "refund.processed" => GatewayRefundStatus::Processed,
            "refund.failed" => GatewayRefundStatus::Failed,
            _ => return Ok(None),
        };

        let entity = envelope
            .payload
            .get("refund")
            .ok_or_else(|| AppError::validation("Webhook payload has no refund entity"))?;
        let refund: RazorpayRefund = serde_json::from_value(entity.entity.clone())?;

        let booking_id = refund
            .notes
            .as_ref()
            .and_then(|n| n.get("booking_id"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let failure_reason = (status == GatewayRefundStatus::Failed)
            .then(|| format!("Razorpay reported refund {} as failed", refund.id));

        Ok(Some(RefundEvent {
            amount: Self::currency_of(&refund).from_minor_units(refund.amount),
            payment_id: refund.payment_id.clone().unwrap_or_default(),
            refund_id: refund.id,
            booking_id,
            status,
            failure_reason,
        }))
    }

    fn name(&self) -> &str {
        "razorpay"
    }
}
