use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::core::{AppError, Result};
use crate::modules::bookings::models::{
    Booking, BookingExtraLine, BookingStatus, CancelledBy, CreateBookingRequest,
};
use crate::modules::bookings::repositories::BookingRepository;
use crate::modules::catalog::services::CatalogService;
use crate::modules::coupons::services::CouponService;
use crate::modules::policies::services::PolicyService;
use crate::modules::refunds::services::RefundCalculator;

/// Customer booking flow and admin lifecycle actions
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    catalog: Arc<CatalogService>,
    coupons: Arc<CouponService>,
    policies: Arc<PolicyService>,
}

impl BookingService {
    pub fn new(
        repo: Arc<dyn BookingRepository>,
        catalog: Arc<CatalogService>,
        coupons: Arc<CouponService>,
        policies: Arc<PolicyService>,
    ) -> Self {
        Self {
            repo,
            catalog,
            coupons,
            policies,
        }
    }

    /// Price a booking from the catalog, apply an optional coupon and pin the
    /// active policy to it
    pub async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking> {
        request.validate()?;
        let now = Utc::now();

        if request.scheduled_at <= now {
            return Err(AppError::validation("Booking time must be in the future"));
        }

        let service = self.catalog.get_service(&request.service_id).await?;
        if !service.is_active {
            return Err(AppError::validation(format!(
                "Service '{}' is not available for booking",
                service.name
            )));
        }
        let service_id = service.get_id()?.to_string();
        let booking_id = uuid::Uuid::new_v4().to_string();

        let mut subtotal = service.price;
        let mut duration_minutes = service.duration_minutes;
        let mut extras = Vec::with_capacity(request.extra_ids.len());

        for extra_id in &request.extra_ids {
            let extra = self.catalog.get_extra(extra_id).await?;
            if extra.service_id != service_id || !extra.is_active {
                return Err(AppError::validation(format!(
                    "Extra '{}' is not available for this service",
                    extra_id
                )));
            }

            subtotal += extra.price;
            duration_minutes += extra.duration_minutes;
            extras.push(BookingExtraLine {
                id: uuid::Uuid::new_v4().to_string(),
                booking_id: booking_id.clone(),
                extra_id: extra_id.clone(),
                name: extra.name,
                price: extra.price,
            });
        }

        let subtotal = service.currency.round(subtotal);
        let applied = match request.coupon_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(
                self.coupons
                    .quote(code, subtotal, service.currency, now)
                    .await?,
            ),
            _ => None,
        };
        let discount_amount = applied.as_ref().map(|c| c.discount).unwrap_or(Decimal::ZERO);

        let policy_id = self.policies.get_active().await?.and_then(|p| p.id);

        let booking = Booking {
            id: Some(booking_id),
            customer_name: request.customer_name.trim().to_string(),
            customer_email: request.customer_email.trim().to_lowercase(),
            customer_phone: request.customer_phone,
            service_id,
            employee_id: request.employee_id,
            policy_id,
            coupon_id: applied.as_ref().map(|c| c.coupon_id.clone()),
            scheduled_at: request.scheduled_at,
            duration_minutes,
            subtotal,
            discount_amount,
            total_amount: (subtotal - discount_amount).max(Decimal::ZERO),
            currency: service.currency,
            status: BookingStatus::Pending,
            payment_id: None,
            cancellation_fee: None,
            refund_amount: None,
            refund_status: None,
            refund_transaction_id: None,
            refund_failure_reason: None,
            refunded_at: None,
            refund_claimed_at: None,
            cancellation_reason: None,
            cancelled_at: None,
            reschedule_count: 0,
            notes: request.notes,
            created_at: Some(now),
            updated_at: Some(now),
            extras,
        };

        if let Some(applied) = &applied {
            self.coupons.redeem(applied).await?;
        }
        if let Err(e) = self.repo.create(&booking).await {
            if let Some(applied) = &applied {
                if let Err(release_err) = self.coupons.release(applied).await {
                    tracing::error!(
                        coupon_id = %applied.coupon_id,
                        error = %release_err,
                        "Failed to release coupon after booking insert failed"
                    );
                }
            }
            return Err(e);
        }

        tracing::info!(
            booking_id = ?booking.id,
            service_id = %booking.service_id,
            total_amount = %booking.total_amount,
            policy_id = ?booking.policy_id,
            "Booking created"
        );

        Ok(booking)
    }

    pub async fn get_booking(&self, id: &str) -> Result<Booking> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking '{}' not found", id)))
    }

    pub async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>> {
        self.repo
            .list(status, limit.clamp(1, 200), offset.max(0))
            .await
    }

    /// Record the captured payment and confirm
    pub async fn confirm_booking(&self, id: &str, payment_id: &str) -> Result<Booking> {
        let payment_id = payment_id.trim();
        if payment_id.is_empty() {
            return Err(AppError::validation("Payment ID cannot be empty"));
        }

        let mut booking = self.get_booking(id).await?;
        let read = (booking.status, booking.reschedule_count);
        booking.transition_to(BookingStatus::Confirmed)?;
        booking.payment_id = Some(payment_id.to_string());
        self.save(&booking, read).await?;

        tracing::info!(booking_id = %id, payment_id = %payment_id, "Booking confirmed");
        Ok(booking)
    }

    pub async fn complete_booking(&self, id: &str) -> Result<Booking> {
        let mut booking = self.get_booking(id).await?;
        let read = (booking.status, booking.reschedule_count);
        booking.transition_to(BookingStatus::Completed)?;
        self.save(&booking, read).await?;

        tracing::info!(booking_id = %id, "Booking completed");
        Ok(booking)
    }

    /// Cancel and price the refund. The refund itself is sent separately.
    pub async fn cancel_booking(
        &self,
        id: &str,
        reason: Option<String>,
        by: CancelledBy,
    ) -> Result<Booking> {
        let now = Utc::now();
        let mut booking = self.get_booking(id).await?;

        if !booking.status.is_open() {
            return Err(AppError::conflict(format!(
                "Cannot cancel a {} booking",
                booking.status
            )));
        }

        let policy = self
            .policies
            .resolve_for_booking(booking.policy_id.as_deref())
            .await?;

        if by == CancelledBy::Customer && booking.within_cancellation_cutoff(policy.as_ref(), now)
        {
            return Err(AppError::conflict(
                "Booking is too close to its start time to be cancelled online",
            ));
        }

        let computation = RefundCalculator::compute(&booking, policy.as_ref(), now);
        let read = (booking.status, booking.reschedule_count);

        booking.transition_to(BookingStatus::Cancelled)?;
        booking.cancellation_fee = Some(computation.cancellation_fee);
        booking.refund_amount = Some(computation.refund_amount);
        booking.refund_status = Some(computation.refund_status);
        booking.cancellation_reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        booking.cancelled_at = Some(now);
        self.save(&booking, read).await?;

        tracing::info!(
            booking_id = %id,
            cancelled_by = ?by,
            cancellation_fee = %computation.cancellation_fee,
            refund_amount = %computation.refund_amount,
            refund_status = %computation.refund_status,
            "Booking cancelled"
        );

        Ok(booking)
    }

    pub async fn reschedule_booking(
        &self,
        id: &str,
        new_time: chrono::DateTime<Utc>,
    ) -> Result<Booking> {
        let now = Utc::now();
        let mut booking = self.get_booking(id).await?;

        let policy = self
            .policies
            .resolve_for_booking(booking.policy_id.as_deref())
            .await?;
        booking.check_reschedulable(policy.as_ref(), new_time, now)?;

        let read = (booking.status, booking.reschedule_count);
        let previous = booking.scheduled_at;
        booking.scheduled_at = new_time;
        booking.reschedule_count += 1;
        booking.updated_at = Some(now);
        self.save(&booking, read).await?;

        tracing::info!(
            booking_id = %id,
            from = %previous,
            to = %new_time,
            reschedule_count = booking.reschedule_count,
            "Booking rescheduled"
        );

        Ok(booking)
    }

    /// Write a lifecycle change unless another request changed the booking
    /// since it was read
    async fn save(&self, booking: &Booking, read: (BookingStatus, i32)) -> Result<()> {
        let (read_status, read_reschedule_count) = read;
        if !self
            .repo
            .update(booking, read_status, read_reschedule_count)
            .await?
        {
            return Err(AppError::conflict(format!(
                "Booking '{}' was modified concurrently, reload and retry",
                booking.get_id()?
            )));
        }
        Ok(())
    }
}
