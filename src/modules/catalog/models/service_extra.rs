use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::salon_service::default_active;
use crate::core::{AppError, Currency, Result};

/// Optional add-on for a service (e.g. "Head massage" on a haircut)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceExtra {
    #[serde(skip_deserializing)]
    pub id: Option<String>,

    #[serde(skip_deserializing)]
    pub service_id: String,

    pub name: String,

    pub price: Decimal,

    /// Extra time added to the appointment
    pub duration_minutes: i32,

    pub is_active: bool,

    #[serde(skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_deserializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraRequest {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ServiceExtra {
    pub fn new(service_id: String, currency: Currency, request: ExtraRequest) -> Result<Self> {
        Self::validate(currency, &request)?;

        let now = Utc::now();
        Ok(Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            service_id,
            name: request.name.trim().to_string(),
            price: request.price,
            duration_minutes: request.duration_minutes,
            is_active: request.is_active,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    pub fn apply(&mut self, currency: Currency, request: ExtraRequest) -> Result<()> {
        Self::validate(currency, &request)?;

        self.name = request.name.trim().to_string();
        self.price = request.price;
        self.duration_minutes = request.duration_minutes;
        self.is_active = request.is_active;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    fn validate(currency: Currency, request: &ExtraRequest) -> Result<()> {
        if request.name.trim().is_empty() {
            return Err(AppError::validation("Extra name cannot be empty"));
        }
        if request.duration_minutes < 0 {
            return Err(AppError::validation("Extra duration cannot be negative"));
        }
        currency
            .validate_amount(request.price)
            .map_err(AppError::validation)
    }
}
