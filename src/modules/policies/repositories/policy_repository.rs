use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::policies::models::BookingPolicySetting;

#[async_trait]
pub trait PolicyRepository: Send + Sync {
    async fn create(&self, policy: &BookingPolicySetting) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<BookingPolicySetting>>;

    async fn find_active(&self) -> Result<Option<BookingPolicySetting>>;

    async fn update(&self, policy: &BookingPolicySetting) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<bool>;

    async fn list(&self) -> Result<Vec<BookingPolicySetting>>;

    /// Make `id` the only active policy
    async fn activate(&self, id: &str) -> Result<()>;
}

pub struct MySqlPolicyRepository {
    pool: MySqlPool,
}

impl MySqlPolicyRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const POLICY_COLUMNS: &str = r#"
    id, name, cancellation_policy, cancellation_fee_type, cancellation_fee_value,
    free_cancellation_hours, cancellation_cutoff_hours, max_reschedules,
    reschedule_cutoff_hours, is_active, created_at, updated_at
"#;

#[async_trait]
impl PolicyRepository for MySqlPolicyRepository {
    async fn create(&self, policy: &BookingPolicySetting) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO booking_policy_settings (
                id, name, cancellation_policy, cancellation_fee_type,
                cancellation_fee_value, free_cancellation_hours,
                cancellation_cutoff_hours, max_reschedules,
                reschedule_cutoff_hours, is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&policy.id)
        .bind(&policy.name)
        .bind(policy.cancellation_policy)
        .bind(policy.cancellation_fee_type)
        .bind(policy.cancellation_fee_value)
        .bind(policy.free_cancellation_hours)
        .bind(policy.cancellation_cutoff_hours)
        .bind(policy.max_reschedules)
        .bind(policy.reschedule_cutoff_hours)
        .bind(policy.is_active)
        .bind(policy.created_at)
        .bind(policy.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create policy: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<BookingPolicySetting>> {
        let query = format!(
            "SELECT {} FROM booking_policy_settings WHERE id = ?",
            POLICY_COLUMNS
        );
        sqlx::query_as::<_, BookingPolicySetting>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch policy: {}", e)))
    }

    async fn find_active(&self) -> Result<Option<BookingPolicySetting>> {
        let query = format!(
            "SELECT {} FROM booking_policy_settings WHERE is_active = TRUE ORDER BY updated_at DESC LIMIT 1",
            POLICY_COLUMNS
        );
        sqlx::query_as::<_, BookingPolicySetting>(&query)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch active policy: {}", e)))
    }

    async fn update(&self, policy: &BookingPolicySetting) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE booking_policy_settings
            SET name = ?, cancellation_policy = ?, cancellation_fee_type = ?,
                cancellation_fee_value = ?, free_cancellation_hours = ?,
                cancellation_cutoff_hours = ?, max_reschedules = ?,
                reschedule_cutoff_hours = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&policy.name)
        .bind(policy.cancellation_policy)
        .bind(policy.cancellation_fee_type)
        .bind(policy.cancellation_fee_value)
        .bind(policy.free_cancellation_hours)
        .bind(policy.cancellation_cutoff_hours)
        .bind(policy.max_reschedules)
        .bind(policy.reschedule_cutoff_hours)
        .bind(&policy.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update policy: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM booking_policy_settings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete policy: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<BookingPolicySetting>> {
        let query = format!(
            "SELECT {} FROM booking_policy_settings ORDER BY created_at DESC",
            POLICY_COLUMNS
        );
        sqlx::query_as::<_, BookingPolicySetting>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to list policies: {}", e)))
    }

    async fn activate(&self, id: &str) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        let result = sqlx::query(
            "UPDATE booking_policy_settings SET is_active = TRUE, updated_at = NOW() WHERE id = ?",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to activate policy: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Policy '{}' not found", id)));
        }

        sqlx::query(
            "UPDATE booking_policy_settings SET is_active = FALSE, updated_at = NOW() WHERE id <> ? AND is_active = TRUE",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to deactivate policies: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))
    }
}
