pub mod services;

pub use services::{
    GatewayRefundStatus, GatewayService, RazorpayClient, RefundEvent, RefundGateway,
    RefundRequest, RefundResponse,
};
