use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{AppError, Result};

/// Refund tier applied when a booking is cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CancellationPolicy {
    /// Whole booking amount is refundable
    FullRefund,
    /// Half of the booking amount is refundable
    PartialRefund,
    /// Customer receives store credit only, no money back
    CreditOnly,
    /// Nothing is refundable
    NoRefund,
}

impl std::fmt::Display for CancellationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancellationPolicy::FullRefund => write!(f, "full_refund"),
            CancellationPolicy::PartialRefund => write!(f, "partial_refund"),
            CancellationPolicy::CreditOnly => write!(f, "credit_only"),
            CancellationPolicy::NoRefund => write!(f, "no_refund"),
        }
    }
}

impl std::str::FromStr for CancellationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "full_refund" => Ok(CancellationPolicy::FullRefund),
            "partial_refund" => Ok(CancellationPolicy::PartialRefund),
            "credit_only" => Ok(CancellationPolicy::CreditOnly),
            "no_refund" => Ok(CancellationPolicy::NoRefund),
            _ => Err(format!("Invalid cancellation policy: {}", s)),
        }
    }
}

/// How `cancellation_fee_value` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    /// Flat amount in the booking currency
    Fixed,
    /// Percentage of the booking total (0-100)
    Percentage,
}

impl Default for FeeType {
    fn default() -> Self {
        FeeType::Fixed
    }
}

/// Configurable cancellation, refund and reschedule rules
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingPolicySetting {
    #[serde(skip_deserializing)]
    pub id: Option<String>,

    pub name: String,

    pub cancellation_policy: CancellationPolicy,

    pub cancellation_fee_type: FeeType,

    pub cancellation_fee_value: Decimal,

    /// Cancelling at least this many hours before the start is free
    pub free_cancellation_hours: i32,

    /// Customers cannot cancel within this many hours of the start (0 disables)
    pub cancellation_cutoff_hours: i32,

    pub max_reschedules: i32,

    /// Rescheduling must happen at least this many hours before the start
    pub reschedule_cutoff_hours: i32,

    #[serde(skip_deserializing)]
    pub is_active: bool,

    #[serde(skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_deserializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRequest {
    pub name: String,
    pub cancellation_policy: CancellationPolicy,
    #[serde(default)]
    pub cancellation_fee_type: FeeType,
    #[serde(default)]
    pub cancellation_fee_value: Decimal,
    #[serde(default = "default_free_cancellation_hours")]
    pub free_cancellation_hours: i32,
    #[serde(default)]
    pub cancellation_cutoff_hours: i32,
    #[serde(default = "default_max_reschedules")]
    pub max_reschedules: i32,
    #[serde(default = "default_reschedule_cutoff_hours")]
    pub reschedule_cutoff_hours: i32,
}

fn default_free_cancellation_hours() -> i32 {
    24
}

fn default_max_reschedules() -> i32 {
    2
}

fn default_reschedule_cutoff_hours() -> i32 {
    12
}

impl BookingPolicySetting {
    pub fn new(request: PolicyRequest) -> Result<Self> {
        Self::validate(&request)?;

        let now = Utc::now();
        Ok(Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            name: request.name.trim().to_string(),
            cancellation_policy: request.cancellation_policy,
            cancellation_fee_type: request.cancellation_fee_type,
            cancellation_fee_value: request.cancellation_fee_value,
            free_cancellation_hours: request.free_cancellation_hours,
            cancellation_cutoff_hours: request.cancellation_cutoff_hours,
            max_reschedules: request.max_reschedules,
            reschedule_cutoff_hours: request.reschedule_cutoff_hours,
            is_active: false,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    pub fn apply(&mut self, request: PolicyRequest) -> Result<()> {
        Self::validate(&request)?;

        self.name = request.name.trim().to_string();
        self.cancellation_policy = request.cancellation_policy;
        self.cancellation_fee_type = request.cancellation_fee_type;
        self.cancellation_fee_value = request.cancellation_fee_value;
        self.free_cancellation_hours = request.free_cancellation_hours;
        self.cancellation_cutoff_hours = request.cancellation_cutoff_hours;
        self.max_reschedules = request.max_reschedules;
        self.reschedule_cutoff_hours = request.reschedule_cutoff_hours;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    fn validate(request: &PolicyRequest) -> Result<()> {
        if request.name.trim().is_empty() {
            return Err(AppError::validation("Policy name cannot be empty"));
        }
        if request.cancellation_fee_value < Decimal::ZERO {
            return Err(AppError::validation(
                "Cancellation fee cannot be negative",
            ));
        }
        if request.cancellation_fee_type == FeeType::Percentage
            && request.cancellation_fee_value > Decimal::ONE_HUNDRED
        {
            return Err(AppError::validation(
                "Percentage cancellation fee cannot exceed 100",
            ));
        }
        if request.free_cancellation_hours < 0
            || request.cancellation_cutoff_hours < 0
            || request.reschedule_cutoff_hours < 0
        {
            return Err(AppError::validation("Policy windows cannot be negative"));
        }
        if request.max_reschedules < 0 {
            return Err(AppError::validation(
                "Maximum reschedules cannot be negative",
            ));
        }
        Ok(())
    }
}
