use crate::core::{Currency, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment gateway able to refund a captured payment
#[async_trait]
pub trait RefundGateway: Send + Sync {
    /// Refund (part of) a captured payment
    async fn create_refund(&self, request: RefundRequest) -> Result<RefundResponse>;

    /// Verify a webhook signature over the raw request body
    fn verify_webhook(&self, signature: &str, payload: &[u8]) -> Result<bool>;

    /// Extract refund information from a webhook body
    fn parse_refund_event(&self, payload: &[u8]) -> Result<Option<RefundEvent>>;

    /// Get gateway name
    fn name(&self) -> &str;
}

/// Refund request data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Booking being refunded (sent as a note)
    pub booking_id: String,

    /// Captured gateway payment
    pub payment_id: String,

    pub amount: Decimal,

    pub currency: Currency,

    pub reason: String,
}

/// Refund response from gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundResponse {
    /// Gateway refund reference
    pub refund_id: String,

    pub status: GatewayRefundStatus,

    pub amount: Decimal,

    /// Full gateway response (JSON)
    pub raw_response: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayRefundStatus {
    Pending,
    Processed,
    Failed,
}

/// Refund state change reported by a webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundEvent {
    pub refund_id: String,
    pub payment_id: String,
    pub booking_id: Option<String>,
    pub amount: Decimal,
    pub status: GatewayRefundStatus,
    pub failure_reason: Option<String>,
}
