use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Customer booking submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub service_id: String,
    #[serde(default)]
    pub extra_ids: Vec<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateBookingRequest {
    pub fn validate(&self) -> Result<()> {
        if self.customer_name.trim().is_empty() {
            return Err(AppError::validation("Customer name cannot be empty"));
        }

        let email = self.customer_email.trim();
        if email.len() < 3 || !email.contains('@') {
            return Err(AppError::validation("Customer email is invalid"));
        }

        if self.service_id.trim().is_empty() {
            return Err(AppError::validation("Service ID cannot be empty"));
        }

        let mut seen = std::collections::HashSet::new();
        if !self.extra_ids.iter().all(|id| seen.insert(id.as_str())) {
            return Err(AppError::validation("Extras cannot be repeated"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleBookingRequest {
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmBookingRequest {
    pub payment_id: String,
}

/// Who is cancelling; admins bypass the customer cutoff window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelledBy {
    Customer,
    Admin,
}
