pub mod catalog_controller;

pub use catalog_controller::{configure_admin, configure_public};
