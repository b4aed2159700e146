use crate::core::{AppError, Currency, Result, SalonClock};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub salon: SalonConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub rate_limit_per_minute: u32,
    pub cors_allowed_origin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SalonConfig {
    pub utc_offset_minutes: i32,
    pub default_currency: Currency,
}

impl SalonConfig {
    pub fn clock(&self) -> Result<SalonClock> {
        SalonClock::from_offset_minutes(self.utc_offset_minutes)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}

impl GatewayConfig {
    /// Razorpay credentials. Only `serve` and `process-refund` talk to the
    /// gateway, so these are loaded on demand rather than in `Config::from_env`.
    pub fn razorpay_from_env() -> Result<Self> {
        Ok(GatewayConfig {
            key_id: env::var("RAZORPAY_KEY_ID")
                .map_err(|_| AppError::Configuration("RAZORPAY_KEY_ID not set".to_string()))?,
            key_secret: env::var("RAZORPAY_KEY_SECRET").map_err(|_| {
                AppError::Configuration("RAZORPAY_KEY_SECRET not set".to_string())
            })?,
            webhook_secret: env::var("RAZORPAY_WEBHOOK_SECRET").map_err(|_| {
                AppError::Configuration("RAZORPAY_WEBHOOK_SECRET not set".to_string())
            })?,
            base_url: env::var("RAZORPAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.razorpay.com".to_string()),
        })
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let default_currency = env::var("DEFAULT_CURRENCY")
            .unwrap_or_else(|_| "INR".to_string())
            .parse::<Currency>()
            .map_err(AppError::Configuration)?;

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            security: SecurityConfig {
                rate_limit_per_minute: parse_var("RATE_LIMIT_PER_MINUTE", "600")?,
                cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok(),
            },
            salon: SalonConfig {
                utc_offset_minutes: parse_var("SALON_UTC_OFFSET_MINUTES", "330")?,
                default_currency,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.security.rate_limit_per_minute == 0 {
            return Err(AppError::Configuration(
                "Rate limit must be greater than 0".to_string(),
            ));
        }

        if self.database.pool_size == 0 {
            return Err(AppError::Configuration(
                "Database pool size must be greater than 0".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(AppError::Configuration(
                "Database max connections must be greater than 0".to_string(),
            ));
        }

        if self.salon.utc_offset_minutes.abs() > 14 * 60 {
            return Err(AppError::Configuration(format!(
                "Salon UTC offset out of range: {} minutes",
                self.salon.utc_offset_minutes
            )));
        }

        Ok(())
    }
}
