pub mod gateway_service;
pub mod gateway_trait;
pub mod razorpay;

pub use gateway_service::GatewayService;
pub use gateway_trait::{
    GatewayRefundStatus, RefundEvent, RefundGateway, RefundRequest, RefundResponse,
};
pub use razorpay::RazorpayClient;
