use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::catalog::models::{ExtraRequest, ServiceRequest};
use crate::modules::catalog::services::CatalogService;

/// GET /services
/// Active services with their extras for the booking flow
pub async fn list_bookable_services(
    service: web::Data<Arc<CatalogService>>,
) -> Result<HttpResponse, AppError> {
    let listing = service.list_bookable().await?;
    Ok(HttpResponse::Ok().json(listing))
}

/// GET /admin/services
pub async fn list_services(
    service: web::Data<Arc<CatalogService>>,
) -> Result<HttpResponse, AppError> {
    let services = service.list_services().await?;
    Ok(HttpResponse::Ok().json(services))
}

/// POST /admin/services
pub async fn create_service(
    service: web::Data<Arc<CatalogService>>,
    request: web::Json<ServiceRequest>,
) -> Result<HttpResponse, AppError> {
    let created = service.create_service(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// GET /admin/services/{id}
pub async fn get_service(
    service: web::Data<Arc<CatalogService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let found = service.get_service(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// PUT /admin/services/{id}
pub async fn update_service(
    service: web::Data<Arc<CatalogService>>,
    path: web::Path<String>,
    request: web::Json<ServiceRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = service
        .update_service(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /admin/services/{id}
pub async fn delete_service(
    service: web::Data<Arc<CatalogService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_service(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /admin/services/{id}/extras
pub async fn list_extras(
    service: web::Data<Arc<CatalogService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let extras = service.list_extras(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(extras))
}

/// POST /admin/services/{id}/extras
pub async fn add_extra(
    service: web::Data<Arc<CatalogService>>,
    path: web::Path<String>,
    request: web::Json<ExtraRequest>,
) -> Result<HttpResponse, AppError> {
    let extra = service
        .add_extra(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(extra))
}

/// PUT /admin/extras/{id}
pub async fn update_extra(
    service: web::Data<Arc<CatalogService>>,
    path: web::Path<String>,
    request: web::Json<ExtraRequest>,
) -> Result<HttpResponse, AppError> {
    let extra = service
        .update_extra(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(extra))
}

/// DELETE /admin/extras/{id}
pub async fn delete_extra(
    service: web::Data<Arc<CatalogService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_extra(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Public catalog routes
pub fn configure_public(cfg: &mut web::ServiceConfig) {
    cfg.route("/services", web::get().to(list_bookable_services));
}

/// Admin catalog routes (mounted under /admin)
pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(list_services))
            .route("", web::post().to(create_service))
            .route("/{id}", web::get().to(get_service))
            .route("/{id}", web::put().to(update_service))
            .route("/{id}", web::delete().to(delete_service))
            .route("/{id}/extras", web::get().to(list_extras))
            .route("/{id}/extras", web::post().to(add_extra)),
    )
    .service(
        web::scope("/extras")
            .route("/{id}", web::put().to(update_extra))
            .route("/{id}", web::delete().to(delete_extra)),
    );
}
