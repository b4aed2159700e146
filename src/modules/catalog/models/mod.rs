pub mod salon_service;
pub mod service_extra;

pub use salon_service::{SalonService, ServiceRequest, ServiceWithExtras};
pub use service_extra::{ExtraRequest, ServiceExtra};
