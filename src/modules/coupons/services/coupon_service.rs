use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::{AppError, Currency, Result};
use crate::modules::coupons::models::{normalize_code, Coupon, CouponRequest};
use crate::modules::coupons::repositories::CouponRepository;

/// A coupon that has been checked against an order
#[derive(Debug, Clone)]
pub struct AppliedCoupon {
    pub coupon_id: String,
    pub code: String,
    pub discount: Decimal,
}

pub struct CouponService {
    repo: Arc<dyn CouponRepository>,
}

impl CouponService {
    pub fn new(repo: Arc<dyn CouponRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_coupon(&self, request: CouponRequest) -> Result<Coupon> {
        let coupon = Coupon::new(request)?;

        if self.repo.find_by_code(&coupon.code).await?.is_some() {
            return Err(AppError::validation(format!(
                "Coupon code '{}' already exists",
                coupon.code
            )));
        }

        self.repo.create(&coupon).await?;
        tracing::info!(code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    pub async fn get_coupon(&self, id: &str) -> Result<Coupon> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Coupon '{}' not found", id)))
    }

    pub async fn update_coupon(&self, id: &str, request: CouponRequest) -> Result<Coupon> {
        let mut coupon = self.get_coupon(id).await?;
        coupon.apply(request)?;

        if let Some(other) = self.repo.find_by_code(&coupon.code).await? {
            if other.id != coupon.id {
                return Err(AppError::validation(format!(
                    "Coupon code '{}' already exists",
                    coupon.code
                )));
            }
        }

        self.repo.update(&coupon).await?;
        Ok(coupon)
    }

    pub async fn delete_coupon(&self, id: &str) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found(format!("Coupon '{}' not found", id)));
        }
        Ok(())
    }

    pub async fn list_coupons(&self, limit: i64, offset: i64) -> Result<Vec<Coupon>> {
        self.repo.list(limit.clamp(1, 200), offset.max(0)).await
    }

    /// Validate `code` against a subtotal without consuming a redemption
    pub async fn quote(
        &self,
        code: &str,
        subtotal: Decimal,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Result<AppliedCoupon> {
        let code = normalize_code(code);
        let coupon = self
            .repo
            .find_by_code(&code)
            .await?
            .ok_or_else(|| AppError::validation(format!("Coupon '{}' does not exist", code)))?;

        let discount = coupon.discount_for(subtotal, currency, now)?;
        let coupon_id = coupon
            .id
            .ok_or_else(|| AppError::internal("Coupon has no ID"))?;

        Ok(AppliedCoupon {
            coupon_id,
            code: coupon.code,
            discount,
        })
    }

    /// Consume one redemption; fails when the usage limit was hit concurrently
    pub async fn redeem(&self, applied: &AppliedCoupon) -> Result<()> {
        if !self.repo.redeem(&applied.coupon_id).await? {
            return Err(AppError::validation(format!(
                "Coupon '{}' has reached its usage limit",
                applied.code
            )));
        }
        Ok(())
    }

    pub async fn release(&self, applied: &AppliedCoupon) -> Result<()> {
        self.repo.release(&applied.coupon_id).await
    }
}
