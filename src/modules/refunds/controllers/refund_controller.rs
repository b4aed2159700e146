use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::refunds::services::RefundService;

#[derive(Debug, Default, Deserialize)]
pub struct RecalculateQuery {
    #[serde(default)]
    pub dry_run: bool,
}

/// POST /admin/bookings/{id}/refund
pub async fn process_refund(
    service: web::Data<Arc<RefundService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let booking = service.process_refund(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// POST /admin/refunds/recalculate?dry_run=true
pub async fn recalculate_refunds(
    service: web::Data<Arc<RefundService>>,
    query: web::Query<RecalculateQuery>,
) -> Result<HttpResponse, AppError> {
    let summary = service.recalculate_cancelled(query.dry_run).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// POST /webhooks/razorpay
/// The signature covers the raw body, so it is read as bytes
pub async fn razorpay_webhook(
    service: web::Data<Arc<RefundService>>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = req
        .headers()
        .get("X-Razorpay-Signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing X-Razorpay-Signature header"))?;

    let booking = service.handle_webhook(signature, &body).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "booking_id": booking.and_then(|b| b.id),
    })))
}

pub fn configure_public(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhooks/razorpay", web::post().to(razorpay_webhook));
}

/// Must be registered before the admin `/bookings` scope, which would
/// otherwise claim `/bookings/{id}/refund`
pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    cfg.route("/bookings/{id}/refund", web::post().to(process_refund))
        .route("/refunds/recalculate", web::post().to(recalculate_refunds));
}
