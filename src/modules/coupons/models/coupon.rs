use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{AppError, Currency, Result};

/// How a coupon's `discount_value` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Percentage of the booking subtotal (0-100)
    Percentage,
    /// Flat amount off
    Fixed,
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::Percentage => write!(f, "percentage"),
            DiscountType::Fixed => write!(f, "fixed"),
        }
    }
}

/// Promotional discount code
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    #[serde(skip_deserializing)]
    pub id: Option<String>,

    /// Unique, stored upper-case
    pub code: String,

    pub discount_type: DiscountType,

    pub discount_value: Decimal,

    /// Minimum subtotal the coupon applies to
    pub min_order_amount: Option<Decimal>,

    /// Cap for percentage discounts
    pub max_discount_amount: Option<Decimal>,

    /// Total redemptions allowed; unlimited when absent
    pub usage_limit: Option<i32>,

    #[serde(skip_deserializing)]
    pub used_count: i32,

    pub valid_from: Option<DateTime<Utc>>,

    pub valid_until: Option<DateTime<Utc>>,

    pub is_active: bool,

    #[serde(skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_deserializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponRequest {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub max_discount_amount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Canonical form used for storage and lookup
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Coupon {
    pub fn new(request: CouponRequest) -> Result<Self> {
        Self::validate(&request)?;

        let now = Utc::now();
        Ok(Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            code: normalize_code(&request.code),
            discount_type: request.discount_type,
            discount_value: request.discount_value,
            min_order_amount: request.min_order_amount,
            max_discount_amount: request.max_discount_amount,
            usage_limit: request.usage_limit,
            used_count: 0,
            valid_from: request.valid_from,
            valid_until: request.valid_until,
            is_active: request.is_active,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    pub fn apply(&mut self, request: CouponRequest) -> Result<()> {
        Self::validate(&request)?;

        self.code = normalize_code(&request.code);
        self.discount_type = request.discount_type;
        self.discount_value = request.discount_value;
        self.min_order_amount = request.min_order_amount;
        self.max_discount_amount = request.max_discount_amount;
        self.usage_limit = request.usage_limit;
        self.valid_from = request.valid_from;
        self.valid_until = request.valid_until;
        self.is_active = request.is_active;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    fn validate(request: &CouponRequest) -> Result<()> {
        let code = normalize_code(&request.code);
        if code.is_empty() || code.len() > 64 {
            return Err(AppError::validation(
                "Coupon code must be between 1 and 64 characters",
            ));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(AppError::validation(
                "Coupon code may only contain letters, digits, '-' and '_'",
            ));
        }
        if request.discount_value <= Decimal::ZERO {
            return Err(AppError::validation("Discount value must be positive"));
        }
        if request.discount_type == DiscountType::Percentage
            && request.discount_value > Decimal::ONE_HUNDRED
        {
            return Err(AppError::validation(
                "Percentage discount cannot exceed 100",
            ));
        }
        if let Some(limit) = request.usage_limit {
            if limit <= 0 {
                return Err(AppError::validation("Usage limit must be positive"));
            }
        }
        if let (Some(from), Some(until)) = (request.valid_from, request.valid_until) {
            if until <= from {
                return Err(AppError::validation(
                    "Coupon validity window must end after it starts",
                ));
            }
        }
        Ok(())
    }

    /// Whether the coupon can be redeemed at `now`, ignoring the order amount
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<()> {
        if !self.is_active {
            return Err(AppError::validation(format!(
                "Coupon '{}' is not active",
                self.code
            )));
        }
        if let Some(from) = self.valid_from {
            if now < from {
                return Err(AppError::validation(format!(
                    "Coupon '{}' is not valid yet",
                    self.code
                )));
            }
        }
        if let Some(until) = self.valid_until {
            if now > until {
                return Err(AppError::validation(format!(
                    "Coupon '{}' has expired",
                    self.code
                )));
            }
        }
        if let Some(limit) = self.usage_limit {
            if self.used_count >= limit {
                return Err(AppError::validation(format!(
                    "Coupon '{}' has reached its usage limit",
                    self.code
                )));
            }
        }
        Ok(())
    }

    /// Discount this coupon grants on `subtotal`, clamped to `[0, subtotal]`
    pub fn discount_for(
        &self,
        subtotal: Decimal,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Result<Decimal> {
        self.check_redeemable(now)?;

        if let Some(minimum) = self.min_order_amount {
            if subtotal < minimum {
                return Err(AppError::validation(format!(
                    "Coupon '{}' requires a minimum order of {}",
                    self.code,
                    currency.format_amount(minimum)
                )));
            }
        }

        let raw = match self.discount_type {
            DiscountType::Percentage => {
                let discount = subtotal * self.discount_value / Decimal::ONE_HUNDRED;
                match self.max_discount_amount {
                    Some(cap) => discount.min(cap),
                    None => discount,
                }
            }
            DiscountType::Fixed => self.discount_value,
        };

        Ok(currency.round(raw.max(Decimal::ZERO).min(subtotal)))
    }
}
