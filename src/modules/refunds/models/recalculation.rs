use rust_decimal::Decimal;
use serde::Serialize;

use crate::modules::bookings::models::RefundStatus;

/// A refund figure that changed (or would change, on a dry run)
#[derive(Debug, Clone, Serialize)]
pub struct RefundAdjustment {
    pub booking_id: String,
    pub previous_refund_amount: Option<Decimal>,
    pub previous_refund_status: Option<RefundStatus>,
    pub cancellation_fee: Decimal,
    pub refund_amount: Decimal,
    pub refund_status: RefundStatus,
}

/// Result of one pass over cancelled bookings
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecalculationSummary {
    pub dry_run: bool,
    pub examined: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub adjustments: Vec<RefundAdjustment>,
}
