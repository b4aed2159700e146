pub mod refund_calculator;
pub mod refund_service;

pub use refund_calculator::{RefundCalculator, RefundComputation};
pub use refund_service::RefundService;
