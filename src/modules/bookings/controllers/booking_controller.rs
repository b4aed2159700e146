use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::bookings::models::{
    BookingStatus, CancelBookingRequest, CancelledBy, ConfirmBookingRequest,
    CreateBookingRequest, RescheduleBookingRequest,
};
use crate::modules::bookings::services::BookingService;

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// POST /bookings
pub async fn create_booking(
    service: web::Data<Arc<BookingService>>,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let booking = service.create_booking(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(booking))
}

/// GET /bookings/{id} and GET /admin/bookings/{id}
pub async fn get_booking(
    service: web::Data<Arc<BookingService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let booking = service.get_booking(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// POST /bookings/{id}/cancel
pub async fn cancel_booking(
    service: web::Data<Arc<BookingService>>,
    path: web::Path<String>,
    request: Option<web::Json<CancelBookingRequest>>,
) -> Result<HttpResponse, AppError> {
    let reason = request.and_then(|r| r.into_inner().reason);
    let booking = service
        .cancel_booking(&path.into_inner(), reason, CancelledBy::Customer)
        .await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// POST /bookings/{id}/reschedule
pub async fn reschedule_booking(
    service: web::Data<Arc<BookingService>>,
    path: web::Path<String>,
    request: web::Json<RescheduleBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let booking = service
        .reschedule_booking(&path.into_inner(), request.scheduled_at)
        .await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// GET /admin/bookings
pub async fn list_bookings(
    service: web::Data<Arc<BookingService>>,
    query: web::Query<ListBookingsQuery>,
) -> Result<HttpResponse, AppError> {
    let bookings = service
        .list_bookings(query.status, query.limit, query.offset)
        .await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// POST /admin/bookings/{id}/confirm
pub async fn confirm_booking(
    service: web::Data<Arc<BookingService>>,
    path: web::Path<String>,
    request: web::Json<ConfirmBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let booking = service
        .confirm_booking(&path.into_inner(), &request.payment_id)
        .await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// POST /admin/bookings/{id}/complete
pub async fn complete_booking(
    service: web::Data<Arc<BookingService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let booking = service.complete_booking(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// POST /admin/bookings/{id}/cancel
/// Admin cancellation ignores the customer cutoff window
pub async fn admin_cancel_booking(
    service: web::Data<Arc<BookingService>>,
    path: web::Path<String>,
    request: Option<web::Json<CancelBookingRequest>>,
) -> Result<HttpResponse, AppError> {
    let reason = request.and_then(|r| r.into_inner().reason);
    let booking = service
        .cancel_booking(&path.into_inner(), reason, CancelledBy::Admin)
        .await?;
    Ok(HttpResponse::Ok().json(booking))
}

pub fn configure_public(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(create_booking))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}/cancel", web::post().to(cancel_booking))
            .route("/{id}/reschedule", web::post().to(reschedule_booking)),
    );
}

/// Admin booking routes (mounted under /admin)
pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(list_bookings))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}/confirm", web::post().to(confirm_booking))
            .route("/{id}/complete", web::post().to(complete_booking))
            .route("/{id}/cancel", web::post().to(admin_cancel_booking)),
    );
}
