pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{ExtraRequest, SalonService, ServiceExtra, ServiceRequest, ServiceWithExtras};
pub use repositories::{CatalogRepository, MySqlCatalogRepository};
pub use services::CatalogService;
