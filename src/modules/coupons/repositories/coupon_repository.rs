use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::coupons::models::Coupon;

#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn create(&self, coupon: &Coupon) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Coupon>>;

    /// Lookup by normalized (upper-case) code
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>>;

    async fn update(&self, coupon: &Coupon) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<bool>;

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Coupon>>;

    /// Increment `used_count` if the usage limit still allows it.
    /// Returns false when the limit was already reached.
    async fn redeem(&self, id: &str) -> Result<bool>;

    /// Give back a redemption whose booking was never written
    async fn release(&self, id: &str) -> Result<()>;
}

pub struct MySqlCouponRepository {
    pool: MySqlPool,
}

impl MySqlCouponRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COUPON_COLUMNS: &str = r#"
    id, code, discount_type, discount_value, min_order_amount,
    max_discount_amount, usage_limit, used_count, valid_from, valid_until,
    is_active, created_at, updated_at
"#;

fn map_write_error(code: &str, e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::validation(format!("Coupon code '{}' already exists", code));
        }
    }
    AppError::Internal(format!("Failed to save coupon: {}", e))
}

#[async_trait]
impl CouponRepository for MySqlCouponRepository {
    async fn create(&self, coupon: &Coupon) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, discount_type, discount_value, min_order_amount,
                max_discount_amount, usage_limit, used_count, valid_from,
                valid_until, is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_order_amount)
        .bind(coupon.max_discount_amount)
        .bind(coupon.usage_limit)
        .bind(coupon.used_count)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(&coupon.code, e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Coupon>> {
        let query = format!("SELECT {} FROM coupons WHERE id = ?", COUPON_COLUMNS);
        sqlx::query_as::<_, Coupon>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch coupon: {}", e)))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        let query = format!("SELECT {} FROM coupons WHERE code = ?", COUPON_COLUMNS);
        sqlx::query_as::<_, Coupon>(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch coupon by code: {}", e)))
    }

    async fn update(&self, coupon: &Coupon) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE coupons
            SET code = ?, discount_type = ?, discount_value = ?, min_order_amount = ?,
                max_discount_amount = ?, usage_limit = ?, valid_from = ?,
                valid_until = ?, is_active = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&coupon.code)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_order_amount)
        .bind(coupon.max_discount_amount)
        .bind(coupon.usage_limit)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .bind(&coupon.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(&coupon.code, e))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete coupon: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Coupon>> {
        let query = format!(
            "SELECT {} FROM coupons ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COUPON_COLUMNS
        );
        sqlx::query_as::<_, Coupon>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to list coupons: {}", e)))
    }

    async fn redeem(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET used_count = used_count + 1, updated_at = NOW()
            WHERE id = ? AND (usage_limit IS NULL OR used_count < usage_limit)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to redeem coupon: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, id: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE coupons
            SET used_count = used_count - 1, updated_at = NOW()
            WHERE id = ? AND used_count > 0
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to release coupon: {}", e)))?;

        Ok(())
    }
}
