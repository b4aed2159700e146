use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::timezone::hours_until;
use crate::core::{AppError, Currency, Result};
use crate::modules::policies::models::{BookingPolicySetting, FeeType};

/// Booking lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Only upcoming bookings may be cancelled or rescheduled
    pub fn is_open(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// Where the money for a cancelled booking stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    /// Refund owed but not yet sent to the gateway
    Pending,
    /// Gateway confirmed the refund
    Processed,
    /// Gateway call failed; operator action needed
    Failed,
    /// Nothing to refund
    NotApplicable,
}

impl RefundStatus {
    /// Statuses the recalculation job may overwrite
    pub fn is_unsettled(status: Option<RefundStatus>) -> bool {
        matches!(
            status,
            None | Some(RefundStatus::Pending) | Some(RefundStatus::NotApplicable)
        )
    }
}

impl std::fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefundStatus::Pending => write!(f, "pending"),
            RefundStatus::Processed => write!(f, "processed"),
            RefundStatus::Failed => write!(f, "failed"),
            RefundStatus::NotApplicable => write!(f, "not_applicable"),
        }
    }
}

/// Extra priced into a booking, copied at booking time
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingExtraLine {
    pub id: String,
    pub booking_id: String,
    pub extra_id: String,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub service_id: String,
    pub employee_id: Option<String>,
    /// Policy in force when the booking was made
    pub policy_id: Option<String>,
    pub coupon_id: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub status: BookingStatus,
    /// Captured gateway payment, required for refunds
    pub payment_id: Option<String>,
    pub cancellation_fee: Option<Decimal>,
    pub refund_amount: Option<Decimal>,
    pub refund_status: Option<RefundStatus>,
    pub refund_transaction_id: Option<String>,
    pub refund_failure_reason: Option<String>,
    pub refunded_at: Option<DateTime<Utc>>,
    /// Set while a gateway refund call is in flight
    pub refund_claimed_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub reschedule_count: i32,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    #[serde(default)]
    pub extras: Vec<BookingExtraLine>,
}

impl Booking {
    pub fn get_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| AppError::internal("Booking has no ID"))
    }

    /// Fee charged for cancelling at `at` under `policy`.
    ///
    /// Free when no policy applies or when `at` is at least
    /// `free_cancellation_hours` before the start. Otherwise the fixed amount
    /// or a percentage of the total, rounded to the currency and never more
    /// than the total.
    pub fn cancellation_fee(
        &self,
        policy: Option<&BookingPolicySetting>,
        at: DateTime<Utc>,
    ) -> Decimal {
        let Some(policy) = policy else {
            return Decimal::ZERO;
        };

        if hours_until(self.scheduled_at, at) >= f64::from(policy.free_cancellation_hours) {
            return Decimal::ZERO;
        }

        let raw = match policy.cancellation_fee_type {
            FeeType::Fixed => policy.cancellation_fee_value,
            FeeType::Percentage => {
                self.total_amount * policy.cancellation_fee_value / Decimal::ONE_HUNDRED
            }
        };

        let ceiling = self.total_amount.max(Decimal::ZERO);
        self.currency.round(raw).clamp(Decimal::ZERO, ceiling)
    }

    /// Customers may not cancel inside the policy's cutoff window
    pub fn within_cancellation_cutoff(
        &self,
        policy: Option<&BookingPolicySetting>,
        at: DateTime<Utc>,
    ) -> bool {
        match policy {
            Some(p) if p.cancellation_cutoff_hours > 0 => {
                hours_until(self.scheduled_at, at) < f64::from(p.cancellation_cutoff_hours)
            }
            _ => false,
        }
    }

    /// Check reschedule limits; `None` policy means rescheduling is unrestricted
    pub fn check_reschedulable(
        &self,
        policy: Option<&BookingPolicySetting>,
        new_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.status.is_open() {
            return Err(AppError::conflict(format!(
                "Cannot reschedule a {} booking",
                self.status
            )));
        }

        if new_time <= now {
            return Err(AppError::validation(
                "New booking time must be in the future",
            ));
        }

        if let Some(policy) = policy {
            if self.reschedule_count >= policy.max_reschedules {
                return Err(AppError::conflict(format!(
                    "Booking has already been rescheduled {} time(s); limit is {}",
                    self.reschedule_count, policy.max_reschedules
                )));
            }

            if hours_until(self.scheduled_at, now) < f64::from(policy.reschedule_cutoff_hours) {
                return Err(AppError::conflict(format!(
                    "Bookings can only be rescheduled at least {} hours before the start",
                    policy.reschedule_cutoff_hours
                )));
            }
        }

        Ok(())
    }

    pub fn transition_to(&mut self, next: BookingStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Cannot move booking from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}
