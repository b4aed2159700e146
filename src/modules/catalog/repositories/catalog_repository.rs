use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::catalog::models::{SalonService, ServiceExtra};

/// Persistence for services and their extras
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_service(&self, service: &SalonService) -> Result<()>;

    async fn find_service(&self, id: &str) -> Result<Option<SalonService>>;

    async fn update_service(&self, service: &SalonService) -> Result<()>;

    /// Returns false when the service did not exist
    async fn delete_service(&self, id: &str) -> Result<bool>;

    async fn list_services(&self, active_only: bool) -> Result<Vec<SalonService>>;

    async fn create_extra(&self, extra: &ServiceExtra) -> Result<()>;

    async fn find_extra(&self, id: &str) -> Result<Option<ServiceExtra>>;

    async fn update_extra(&self, extra: &ServiceExtra) -> Result<()>;

    async fn delete_extra(&self, id: &str) -> Result<bool>;

    async fn list_extras(&self, service_id: &str, active_only: bool) -> Result<Vec<ServiceExtra>>;

    /// Whether any booking references the service
    async fn service_has_bookings(&self, id: &str) -> Result<bool>;
}

/// MySQL-backed catalog repository
pub struct MySqlCatalogRepository {
    pool: MySqlPool,
}

impl MySqlCatalogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const SERVICE_COLUMNS: &str = r#"
    id, name, description, duration_minutes, price, currency,
    is_active, created_at, updated_at
"#;

const EXTRA_COLUMNS: &str = r#"
    id, service_id, name, price, duration_minutes, is_active,
    created_at, updated_at
"#;

#[async_trait]
impl CatalogRepository for MySqlCatalogRepository {
    async fn create_service(&self, service: &SalonService) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO services (
                id, name, description, duration_minutes, price, currency,
                is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.duration_minutes)
        .bind(service.price)
        .bind(service.currency)
        .bind(service.is_active)
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create service: {}", e)))?;

        Ok(())
    }

    async fn find_service(&self, id: &str) -> Result<Option<SalonService>> {
        let query = format!("SELECT {} FROM services WHERE id = ?", SERVICE_COLUMNS);
        sqlx::query_as::<_, SalonService>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch service: {}", e)))
    }

    async fn update_service(&self, service: &SalonService) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE services
            SET name = ?, description = ?, duration_minutes = ?, price = ?,
                currency = ?, is_active = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.duration_minutes)
        .bind(service.price)
        .bind(service.currency)
        .bind(service.is_active)
        .bind(&service.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update service: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Service '{}' not found",
                service.id.as_deref().unwrap_or_default()
            )));
        }
        Ok(())
    }

    async fn delete_service(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete service: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_services(&self, active_only: bool) -> Result<Vec<SalonService>> {
        let query = if active_only {
            format!(
                "SELECT {} FROM services WHERE is_active = TRUE ORDER BY name",
                SERVICE_COLUMNS
            )
        } else {
            format!("SELECT {} FROM services ORDER BY name", SERVICE_COLUMNS)
        };

        sqlx::query_as::<_, SalonService>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to list services: {}", e)))
    }

    async fn create_extra(&self, extra: &ServiceExtra) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO service_extras (
                id, service_id, name, price, duration_minutes, is_active,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&extra.id)
        .bind(&extra.service_id)
        .bind(&extra.name)
        .bind(extra.price)
        .bind(extra.duration_minutes)
        .bind(extra.is_active)
        .bind(extra.created_at)
        .bind(extra.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create extra: {}", e)))?;

        Ok(())
    }

    async fn find_extra(&self, id: &str) -> Result<Option<ServiceExtra>> {
        let query = format!("SELECT {} FROM service_extras WHERE id = ?", EXTRA_COLUMNS);
        sqlx::query_as::<_, ServiceExtra>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch extra: {}", e)))
    }

    async fn update_extra(&self, extra: &ServiceExtra) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE service_extras
            SET name = ?, price = ?, duration_minutes = ?, is_active = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&extra.name)
        .bind(extra.price)
        .bind(extra.duration_minutes)
        .bind(extra.is_active)
        .bind(&extra.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update extra: {}", e)))?;

        Ok(())
    }

    async fn delete_extra(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM service_extras WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete extra: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_extras(&self, service_id: &str, active_only: bool) -> Result<Vec<ServiceExtra>> {
        let filter = if active_only { " AND is_active = TRUE" } else { "" };
        let query = format!(
            "SELECT {} FROM service_extras WHERE service_id = ?{} ORDER BY name",
            EXTRA_COLUMNS, filter
        );

        sqlx::query_as::<_, ServiceExtra>(&query)
            .bind(service_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to list extras: {}", e)))
    }

    async fn service_has_bookings(&self, id: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE service_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to count bookings: {}", e)))?;

        Ok(row.0 > 0)
    }
}
