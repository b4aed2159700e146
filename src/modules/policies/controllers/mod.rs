pub mod policy_controller;

pub use policy_controller::configure_admin;
