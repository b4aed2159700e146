use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ServiceExtra;
use crate::core::{AppError, Currency, Result};

/// A bookable treatment offered by the salon
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalonService {
    #[serde(skip_deserializing)]
    pub id: Option<String>,

    pub name: String,

    pub description: Option<String>,

    /// Appointment length without extras
    pub duration_minutes: i32,

    pub price: Decimal,

    pub currency: Currency,

    pub is_active: bool,

    #[serde(skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_deserializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or replacing a service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: Decimal,
    /// Falls back to the salon's default currency
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

pub(crate) fn default_active() -> bool {
    true
}

/// Public listing entry: a service together with its bookable extras
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceWithExtras {
    #[serde(flatten)]
    pub service: SalonService,
    pub extras: Vec<ServiceExtra>,
}

impl SalonService {
    pub fn new(request: ServiceRequest) -> Result<Self> {
        Self::validate(&request)?;

        let now = Utc::now();
        Ok(Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            name: request.name.trim().to_string(),
            description: request.description,
            duration_minutes: request.duration_minutes,
            price: request.price,
            currency: request.currency.unwrap_or_default(),
            is_active: request.is_active,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    /// Apply an update payload in place
    pub fn apply(&mut self, request: ServiceRequest) -> Result<()> {
        Self::validate(&request)?;

        self.name = request.name.trim().to_string();
        self.description = request.description;
        self.duration_minutes = request.duration_minutes;
        self.price = request.price;
        self.currency = request.currency.unwrap_or_default();
        self.is_active = request.is_active;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn get_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| AppError::internal("Service has no ID"))
    }

    fn validate(request: &ServiceRequest) -> Result<()> {
        if request.name.trim().is_empty() {
            return Err(AppError::validation("Service name cannot be empty"));
        }
        if request.name.len() > 255 {
            return Err(AppError::validation(
                "Service name cannot exceed 255 characters",
            ));
        }
        if request.duration_minutes <= 0 {
            return Err(AppError::validation("Service duration must be positive"));
        }
        request
            .currency
            .unwrap_or_default()
            .validate_amount(request.price)
            .map_err(AppError::validation)?;
        Ok(())
    }
}
