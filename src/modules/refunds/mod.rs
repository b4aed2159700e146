pub mod controllers;
pub mod models;
pub mod services;

pub use models::{RecalculationSummary, RefundAdjustment};
pub use services::{RefundCalculator, RefundComputation, RefundService};
