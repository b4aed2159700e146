use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::bookings::models::{Booking, BookingExtraLine, BookingStatus, RefundStatus};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert the booking and its extra lines together
    async fn create(&self, booking: &Booking) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>>;

    async fn find_by_refund_transaction_id(&self, refund_id: &str) -> Result<Option<Booking>>;

    async fn list(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>>;

    /// Cancelled bookings whose refund is still open to recalculation
    async fn find_cancelled_unsettled(&self) -> Result<Vec<Booking>>;

    /// Persist lifecycle fields (status, schedule, payment, cancellation)
    /// provided the stored status and reschedule count are still the ones
    /// the caller read. Returns false when the row has moved on.
    async fn update(
        &self,
        booking: &Booking,
        read_status: BookingStatus,
        read_reschedule_count: i32,
    ) -> Result<bool>;

    /// Write a recalculated fee, refund amount and refund status, only while
    /// the refund status is still `read_status` and no refund call holds the row
    async fn save_recalculated_refund(
        &self,
        booking: &Booking,
        read_status: Option<RefundStatus>,
    ) -> Result<bool>;

    /// Reserve a cancelled booking with a `pending` or `failed` refund for a
    /// single gateway call. Returns false when it is not refundable or
    /// another call already holds it.
    async fn claim_refund(&self, id: &str, claimed_at: DateTime<Utc>) -> Result<bool>;

    /// Record a refund outcome and release any claim
    async fn update_refund(&self, booking: &Booking) -> Result<()>;
}

pub struct MySqlBookingRepository {
    pool: MySqlPool,
}

impl MySqlBookingRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn load_extras(&self, booking: &mut Booking) -> Result<()> {
        let id = booking.get_id()?.to_string();
        booking.extras = sqlx::query_as::<_, BookingExtraLine>(
            "SELECT id, booking_id, extra_id, name, price FROM booking_extras WHERE booking_id = ? ORDER BY name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch booking extras: {}", e)))?;
        Ok(())
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Booking>> {
        let query = format!("SELECT {} FROM bookings WHERE {}", BOOKING_COLUMNS, clause);
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch booking: {}", e)))?;

        match booking {
            Some(mut booking) => {
                self.load_extras(&mut booking).await?;
                Ok(Some(booking))
            }
            None => Ok(None),
        }
    }
}

const BOOKING_COLUMNS: &str = r#"
    id, customer_name, customer_email, customer_phone, service_id, employee_id,
    policy_id, coupon_id, scheduled_at, duration_minutes, subtotal,
    discount_amount, total_amount, currency, status, payment_id,
    cancellation_fee, refund_amount, refund_status, refund_transaction_id,
    refund_failure_reason, refunded_at, refund_claimed_at, cancellation_reason,
    cancelled_at, reschedule_count, notes, created_at, updated_at
"#;

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, customer_name, customer_email, customer_phone, service_id,
                employee_id, policy_id, coupon_id, scheduled_at, duration_minutes,
                subtotal, discount_amount, total_amount, currency, status,
                reschedule_count, notes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(&booking.service_id)
        .bind(&booking.employee_id)
        .bind(&booking.policy_id)
        .bind(&booking.coupon_id)
        .bind(booking.scheduled_at)
        .bind(booking.duration_minutes)
        .bind(booking.subtotal)
        .bind(booking.discount_amount)
        .bind(booking.total_amount)
        .bind(booking.currency)
        .bind(booking.status)
        .bind(booking.reschedule_count)
        .bind(&booking.notes)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create booking: {}", e)))?;

        for line in &booking.extras {
            sqlx::query(
                "INSERT INTO booking_extras (id, booking_id, extra_id, name, price) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&line.id)
            .bind(&line.booking_id)
            .bind(&line.extra_id)
            .bind(&line.name)
            .bind(line.price)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create booking extra: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>> {
        self.fetch_one_where("id = ?", id).await
    }

    async fn find_by_refund_transaction_id(&self, refund_id: &str) -> Result<Option<Booking>> {
        self.fetch_one_where("refund_transaction_id = ?", refund_id)
            .await
    }

    async fn list(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>> {
        let bookings = match status {
            Some(status) => {
                let query = format!(
                    "SELECT {} FROM bookings WHERE status = ? ORDER BY scheduled_at DESC LIMIT ? OFFSET ?",
                    BOOKING_COLUMNS
                );
                sqlx::query_as::<_, Booking>(&query)
                    .bind(status)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {} FROM bookings ORDER BY scheduled_at DESC LIMIT ? OFFSET ?",
                    BOOKING_COLUMNS
                );
                sqlx::query_as::<_, Booking>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| AppError::Internal(format!("Failed to list bookings: {}", e)))?;

        Ok(bookings)
    }

    async fn find_cancelled_unsettled(&self) -> Result<Vec<Booking>> {
        let query = format!(
            r#"
            SELECT {} FROM bookings
            WHERE status = 'cancelled'
              AND (refund_status IS NULL OR refund_status IN ('pending', 'not_applicable'))
              AND refund_claimed_at IS NULL
            ORDER BY cancelled_at ASC
            "#,
            BOOKING_COLUMNS
        );
        sqlx::query_as::<_, Booking>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch cancelled bookings: {}", e)))
    }

    async fn update(
        &self,
        booking: &Booking,
        read_status: BookingStatus,
        read_reschedule_count: i32,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = ?, payment_id = ?, scheduled_at = ?, reschedule_count = ?,
                cancellation_fee = ?, refund_amount = ?, refund_status = ?,
                cancellation_reason = ?, cancelled_at = ?, updated_at = NOW()
            WHERE id = ? AND status = ? AND reschedule_count = ?
            "#,
        )
        .bind(booking.status)
        .bind(&booking.payment_id)
        .bind(booking.scheduled_at)
        .bind(booking.reschedule_count)
        .bind(booking.cancellation_fee)
        .bind(booking.refund_amount)
        .bind(booking.refund_status)
        .bind(&booking.cancellation_reason)
        .bind(booking.cancelled_at)
        .bind(&booking.id)
        .bind(read_status)
        .bind(read_reschedule_count)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update booking: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn save_recalculated_refund(
        &self,
        booking: &Booking,
        read_status: Option<RefundStatus>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET cancellation_fee = ?, refund_amount = ?, refund_status = ?, updated_at = NOW()
            WHERE id = ? AND status = 'cancelled'
              AND refund_status <=> ?
              AND refund_claimed_at IS NULL
            "#,
        )
        .bind(booking.cancellation_fee)
        .bind(booking.refund_amount)
        .bind(booking.refund_status)
        .bind(&booking.id)
        .bind(read_status)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update refund: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn claim_refund(&self, id: &str, claimed_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET refund_claimed_at = ?
            WHERE id = ? AND status = 'cancelled'
              AND refund_status IN ('pending', 'failed')
              AND refund_claimed_at IS NULL
            "#,
        )
        .bind(claimed_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to claim refund: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_refund(&self, booking: &Booking) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET cancellation_fee = ?, refund_amount = ?, refund_status = ?,
                refund_transaction_id = ?, refund_failure_reason = ?,
                refunded_at = ?, refund_claimed_at = NULL, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(booking.cancellation_fee)
        .bind(booking.refund_amount)
        .bind(booking.refund_status)
        .bind(&booking.refund_transaction_id)
        .bind(&booking.refund_failure_reason)
        .bind(booking.refunded_at)
        .bind(&booking.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update refund: {}", e)))?;

        Ok(())
    }
}
