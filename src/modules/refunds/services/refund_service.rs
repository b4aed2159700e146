use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::refund_calculator::RefundCalculator;
use crate::core::{AppError, Result};
use crate::modules::bookings::models::{Booking, BookingStatus, RefundStatus};
use crate::modules::bookings::repositories::BookingRepository;
use crate::modules::gateways::{GatewayRefundStatus, GatewayService, RefundEvent, RefundRequest};
use crate::modules::policies::services::PolicyService;
use crate::modules::refunds::models::{RecalculationSummary, RefundAdjustment};

/// Refund orchestration: recomputing owed amounts and sending them to the gateway
pub struct RefundService {
    bookings: Arc<dyn BookingRepository>,
    policies: Arc<PolicyService>,
    gateways: Arc<GatewayService>,
    gateway_name: String,
}

impl RefundService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        policies: Arc<PolicyService>,
        gateways: Arc<GatewayService>,
        gateway_name: impl Into<String>,
    ) -> Self {
        Self {
            bookings,
            policies,
            gateways,
            gateway_name: gateway_name.into(),
        }
    }

    /// Recompute fee, refund and status for every cancelled booking whose
    /// refund has not been settled. A failing booking is logged and counted;
    /// the rest of the batch still runs.
    pub async fn recalculate_cancelled(&self, dry_run: bool) -> Result<RecalculationSummary> {
        let bookings = self.bookings.find_cancelled_unsettled().await?;
        let mut summary = RecalculationSummary {
            dry_run,
            ..Default::default()
        };

        info!(count = bookings.len(), dry_run, "Recalculating cancelled booking refunds");

        for booking in bookings {
            summary.examined += 1;

            match self.recalculate_one(&booking, dry_run).await {
                Ok(Some(adjustment)) => {
                    summary.updated += 1;
                    summary.adjustments.push(adjustment);
                }
                Ok(None) => summary.unchanged += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(booking_id = ?booking.id, error = %e, "Refund recalculation failed");
                }
            }
        }

        info!(
            examined = summary.examined,
            updated = summary.updated,
            unchanged = summary.unchanged,
            failed = summary.failed,
            dry_run,
            "Refund recalculation finished"
        );

        Ok(summary)
    }

    async fn recalculate_one(
        &self,
        booking: &Booking,
        dry_run: bool,
    ) -> Result<Option<RefundAdjustment>> {
        let booking_id = booking.get_id()?.to_string();
        let policy = self
            .policies
            .resolve_for_booking(booking.policy_id.as_deref())
            .await?;

        let at = booking.cancelled_at.unwrap_or_else(Utc::now);
        let computation = RefundCalculator::compute(booking, policy.as_ref(), at);

        let unchanged = booking.cancellation_fee == Some(computation.cancellation_fee)
            && booking.refund_amount == Some(computation.refund_amount)
            && booking.refund_status == Some(computation.refund_status);
        if unchanged {
            return Ok(None);
        }

        if !dry_run {
            let mut updated = booking.clone();
            updated.cancellation_fee = Some(computation.cancellation_fee);
            updated.refund_amount = Some(computation.refund_amount);
            updated.refund_status = Some(computation.refund_status);

            if !self
                .bookings
                .save_recalculated_refund(&updated, booking.refund_status)
                .await?
            {
                warn!(
                    booking_id = %booking_id,
                    "Refund changed during recalculation, leaving it as is"
                );
                return Ok(None);
            }
        }

        info!(
            booking_id = %booking_id,
            previous_refund_amount = ?booking.refund_amount,
            refund_amount = %computation.refund_amount,
            refund_status = %computation.refund_status,
            dry_run,
            "Refund recalculated"
        );

        Ok(Some(RefundAdjustment {
            booking_id,
            previous_refund_amount: booking.refund_amount,
            previous_refund_status: booking.refund_status,
            cancellation_fee: computation.cancellation_fee,
            refund_amount: computation.refund_amount,
            refund_status: computation.refund_status,
        }))
    }

    /// Send the owed refund for a cancelled booking to the gateway, once.
    /// The booking is claimed before the call so concurrent requests cannot
    /// both reach the gateway. A gateway failure marks the booking `failed`
    /// and is returned to the caller.
    pub async fn process_refund(&self, booking_id: &str) -> Result<Booking> {
        let booking = self.load(booking_id).await?;
        Self::check_refundable(&booking)?;

        if !self.bookings.claim_refund(booking_id, Utc::now()).await? {
            return Err(AppError::conflict(format!(
                "Refund for booking '{}' is already being processed",
                booking_id
            )));
        }

        // Re-read under the claim so the amount sent is the one stored now
        let booking = self.load(booking_id).await?;
        if let Err(e) = Self::check_refundable(&booking) {
            self.release_claim(&booking).await;
            return Err(e);
        }

        self.send_refund(booking).await
    }

    async fn load(&self, booking_id: &str) -> Result<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking '{}' not found", booking_id)))
    }

    async fn release_claim(&self, booking: &Booking) {
        let mut released = booking.clone();
        released.refund_claimed_at = None;
        if let Err(e) = self.bookings.update_refund(&released).await {
            error!(booking_id = ?booking.id, error = %e, "Failed to release refund claim");
        }
    }

    fn check_refundable(booking: &Booking) -> Result<()> {
        let booking_id = booking.get_id()?;

        if booking.status != BookingStatus::Cancelled {
            return Err(AppError::conflict(format!(
                "Booking '{}' is {}, only cancelled bookings can be refunded",
                booking_id, booking.status
            )));
        }

        match booking.refund_status {
            Some(RefundStatus::Pending) | Some(RefundStatus::Failed) => {}
            Some(RefundStatus::Processed) => {
                return Err(AppError::conflict(format!(
                    "Refund for booking '{}' was already processed",
                    booking_id
                )));
            }
            _ => {
                return Err(AppError::conflict(format!(
                    "Booking '{}' has no refund owed",
                    booking_id
                )));
            }
        }

        if !booking.refund_amount.is_some_and(|a| a > Decimal::ZERO) {
            return Err(AppError::conflict(format!(
                "Booking '{}' has no refund owed",
                booking_id
            )));
        }

        if booking.payment_id.is_none() {
            return Err(AppError::validation(format!(
                "Booking '{}' has no captured payment to refund",
                booking_id
            )));
        }

        Ok(())
    }

    async fn send_refund(&self, mut booking: Booking) -> Result<Booking> {
        let booking_id = booking.get_id()?.to_string();
        let amount = booking.refund_amount.unwrap_or_default();
        let payment_id = booking.payment_id.clone().unwrap_or_default();

        let request = RefundRequest {
            booking_id: booking_id.clone(),
            payment_id,
            amount,
            currency: booking.currency,
            reason: booking
                .cancellation_reason
                .clone()
                .unwrap_or_else(|| "Booking cancelled".to_string()),
        };

        let outcome = self
            .gateways
            .create_refund(&self.gateway_name, request)
            .await
            .and_then(|response| {
                if response.status == GatewayRefundStatus::Failed {
                    Err(AppError::gateway(format!(
                        "Gateway rejected refund {}",
                        response.refund_id
                    )))
                } else {
                    Ok(response)
                }
            });

        match outcome {
            Ok(response) => {
                booking.refund_status = Some(RefundStatus::Processed);
                booking.refund_transaction_id = Some(response.refund_id.clone());
                booking.refund_failure_reason = None;
                booking.refunded_at = Some(Utc::now());
                booking.refund_claimed_at = None;
                self.bookings.update_refund(&booking).await?;

                info!(
                    booking_id = %booking_id,
                    refund_id = %response.refund_id,
                    refund_amount = %amount,
                    gateway = %self.gateway_name,
                    "Refund processed"
                );
                Ok(booking)
            }
            Err(e) => {
                booking.refund_status = Some(RefundStatus::Failed);
                booking.refund_failure_reason = Some(e.to_string());
                booking.refund_claimed_at = None;
                if let Err(save_err) = self.bookings.update_refund(&booking).await {
                    error!(
                        booking_id = %booking_id,
                        error = %save_err,
                        "Failed to record refund failure"
                    );
                }

                error!(
                    booking_id = %booking_id,
                    refund_amount = %amount,
                    gateway = %self.gateway_name,
                    error = %e,
                    "Refund failed"
                );
                Err(e)
            }
        }
    }

    /// Verify and apply a gateway webhook. Returns the reconciled booking,
    /// or `None` when the event is not a refund event or matches no booking.
    pub async fn handle_webhook(
        &self,
        signature: &str,
        payload: &[u8],
    ) -> Result<Option<Booking>> {
        let gateway = self.gateways.get_gateway(&self.gateway_name)?;

        if !gateway.verify_webhook(signature, payload)? {
            warn!(gateway = %self.gateway_name, "Rejected webhook with invalid signature");
            return Err(AppError::unauthorized("Invalid webhook signature"));
        }

        match gateway.parse_refund_event(payload)? {
            Some(event) => self.apply_gateway_event(event).await,
            None => Ok(None),
        }
    }

    /// Reconcile a booking with a gateway refund event. Replays are no-ops.
    pub async fn apply_gateway_event(&self, event: RefundEvent) -> Result<Option<Booking>> {
        let booking = match &event.booking_id {
            Some(id) => self.bookings.find_by_id(id).await?,
            None => None,
        };
        let booking = match booking {
            Some(b) => Some(b),
            None => {
                self.bookings
                    .find_by_refund_transaction_id(&event.refund_id)
                    .await?
            }
        };

        let Some(mut booking) = booking else {
            warn!(refund_id = %event.refund_id, "Refund event matches no booking");
            return Ok(None);
        };

        let target = match event.status {
            GatewayRefundStatus::Processed => RefundStatus::Processed,
            GatewayRefundStatus::Failed => RefundStatus::Failed,
            GatewayRefundStatus::Pending => return Ok(Some(booking)),
        };

        if booking.refund_status == Some(target)
            && booking.refund_transaction_id.as_deref() == Some(event.refund_id.as_str())
        {
            return Ok(Some(booking));
        }

        booking.refund_status = Some(target);
        booking.refund_transaction_id = Some(event.refund_id.clone());
        match target {
            RefundStatus::Processed => {
                booking.refund_failure_reason = None;
                booking.refunded_at = booking.refunded_at.or_else(|| Some(Utc::now()));
            }
            _ => {
                booking.refund_failure_reason = event.failure_reason.clone();
            }
        }
        self.bookings.update_refund(&booking).await?;

        info!(
            booking_id = ?booking.id,
            refund_id = %event.refund_id,
            refund_status = %target,
            "Refund reconciled from gateway event"
        );

        Ok(Some(booking))
    }
}
