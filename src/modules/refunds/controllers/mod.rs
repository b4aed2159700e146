pub mod refund_controller;

pub use refund_controller::{configure_admin, configure_public};
