use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::modules::bookings::models::{Booking, RefundStatus};
use crate::modules::policies::models::{BookingPolicySetting, CancellationPolicy};

/// Outcome of applying a policy to a cancelled booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefundComputation {
    pub cancellation_fee: Decimal,
    pub refund_amount: Decimal,
    pub refund_status: RefundStatus,
}

/// Pure refund arithmetic; no I/O
pub struct RefundCalculator;

impl RefundCalculator {
    /// Refundable portion of `total` before the cancellation fee.
    /// No resolvable policy refunds the full total.
    pub fn refund_base(total: Decimal, policy: Option<CancellationPolicy>) -> Decimal {
        match policy {
            None | Some(CancellationPolicy::FullRefund) => total,
            Some(CancellationPolicy::PartialRefund) => total * Decimal::new(5, 1),
            Some(CancellationPolicy::CreditOnly) | Some(CancellationPolicy::NoRefund) => {
                Decimal::ZERO
            }
        }
    }

    /// `refund = max(0, base - fee)`; pending when money is owed
    pub fn refund_amount(base: Decimal, fee: Decimal) -> Decimal {
        (base - fee).max(Decimal::ZERO)
    }

    pub fn status_for(refund_amount: Decimal) -> RefundStatus {
        if refund_amount > Decimal::ZERO {
            RefundStatus::Pending
        } else {
            RefundStatus::NotApplicable
        }
    }

    /// Fee, refund and status for `booking` cancelled at `at`
    pub fn compute(
        booking: &Booking,
        policy: Option<&BookingPolicySetting>,
        at: DateTime<Utc>,
    ) -> RefundComputation {
        let cancellation_fee = booking.cancellation_fee(policy, at);
        let base = booking.currency.round(Self::refund_base(
            booking.total_amount,
            policy.map(|p| p.cancellation_policy),
        ));
        let refund_amount = Self::refund_amount(base, cancellation_fee);

        RefundComputation {
            cancellation_fee,
            refund_amount,
            refund_status: Self::status_for(refund_amount),
        }
    }
}
