use std::sync::Arc;

use crate::core::{AppError, Currency, Result};
use crate::modules::catalog::models::{
    ExtraRequest, SalonService, ServiceExtra, ServiceRequest, ServiceWithExtras,
};
use crate::modules::catalog::repositories::CatalogRepository;

/// Admin CRUD for services/extras and the public service listing
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
    default_currency: Currency,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>, default_currency: Currency) -> Self {
        Self {
            repo,
            default_currency,
        }
    }

    fn with_currency(&self, mut request: ServiceRequest) -> ServiceRequest {
        request.currency.get_or_insert(self.default_currency);
        request
    }

    pub async fn create_service(&self, request: ServiceRequest) -> Result<SalonService> {
        let service = SalonService::new(self.with_currency(request))?;
        self.repo.create_service(&service).await?;

        tracing::info!(service_id = ?service.id, name = %service.name, "Service created");
        Ok(service)
    }

    pub async fn get_service(&self, id: &str) -> Result<SalonService> {
        self.repo
            .find_service(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Service '{}' not found", id)))
    }

    pub async fn update_service(&self, id: &str, request: ServiceRequest) -> Result<SalonService> {
        let mut service = self.get_service(id).await?;
        service.apply(self.with_currency(request))?;
        self.repo.update_service(&service).await?;
        Ok(service)
    }

    /// Services referenced by bookings cannot be deleted, only deactivated
    pub async fn delete_service(&self, id: &str) -> Result<()> {
        if self.repo.service_has_bookings(id).await? {
            return Err(AppError::conflict(format!(
                "Service '{}' has bookings; deactivate it instead",
                id
            )));
        }

        if !self.repo.delete_service(id).await? {
            return Err(AppError::not_found(format!("Service '{}' not found", id)));
        }

        tracing::info!(service_id = %id, "Service deleted");
        Ok(())
    }

    pub async fn list_services(&self) -> Result<Vec<SalonService>> {
        self.repo.list_services(false).await
    }

    /// Active services with their active extras, for the booking screen
    pub async fn list_bookable(&self) -> Result<Vec<ServiceWithExtras>> {
        let services = self.repo.list_services(true).await?;
        let mut listing = Vec::with_capacity(services.len());

        for service in services {
            let extras = self.repo.list_extras(service.get_id()?, true).await?;
            listing.push(ServiceWithExtras { service, extras });
        }

        Ok(listing)
    }

    pub async fn add_extra(&self, service_id: &str, request: ExtraRequest) -> Result<ServiceExtra> {
        let service = self.get_service(service_id).await?;
        let extra = ServiceExtra::new(service_id.to_string(), service.currency, request)?;
        self.repo.create_extra(&extra).await?;
        Ok(extra)
    }

    pub async fn get_extra(&self, id: &str) -> Result<ServiceExtra> {
        self.repo
            .find_extra(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Extra '{}' not found", id)))
    }

    pub async fn update_extra(&self, id: &str, request: ExtraRequest) -> Result<ServiceExtra> {
        let mut extra = self.get_extra(id).await?;
        let service = self.get_service(&extra.service_id).await?;
        extra.apply(service.currency, request)?;
        self.repo.update_extra(&extra).await?;
        Ok(extra)
    }

    pub async fn delete_extra(&self, id: &str) -> Result<()> {
        if !self.repo.delete_extra(id).await? {
            return Err(AppError::not_found(format!("Extra '{}' not found", id)));
        }
        Ok(())
    }

    pub async fn list_extras(&self, service_id: &str) -> Result<Vec<ServiceExtra>> {
        self.get_service(service_id).await?;
        self.repo.list_extras(service_id, false).await
    }
}
