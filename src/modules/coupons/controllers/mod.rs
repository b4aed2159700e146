pub mod coupon_controller;

pub use coupon_controller::configure_admin;
