pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{BookingPolicySetting, CancellationPolicy, FeeType, PolicyRequest};
pub use repositories::{MySqlPolicyRepository, PolicyRepository};
pub use services::PolicyService;
