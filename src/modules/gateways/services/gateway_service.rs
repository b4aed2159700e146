use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use super::gateway_trait::{RefundGateway, RefundRequest, RefundResponse};
use crate::core::{AppError, Result};

/// Registry of refund-capable gateways by name
pub struct GatewayService {
    gateways: HashMap<String, Arc<dyn RefundGateway>>,
}

impl GatewayService {
    pub fn new() -> Self {
        Self {
            gateways: HashMap::new(),
        }
    }

    pub fn register_gateway(&mut self, gateway: Arc<dyn RefundGateway>) {
        let name = gateway.name().to_string();
        self.gateways.insert(name, gateway);
    }

    pub fn get_gateway(&self, name: &str) -> Result<Arc<dyn RefundGateway>> {
        self.gateways
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Gateway '{}' not found", name)))
    }

    /// Refund through the named gateway; errors are logged and returned as-is
    pub async fn create_refund(
        &self,
        gateway_name: &str,
        request: RefundRequest,
    ) -> Result<RefundResponse> {
        info!(
            gateway = %gateway_name,
            booking_id = %request.booking_id,
            payment_id = %request.payment_id,
            amount = %request.amount,
            currency = %request.currency,
            "Requesting refund from gateway"
        );

        let gateway = self.get_gateway(gateway_name)?;

        match gateway.create_refund(request).await {
            Ok(response) => {
                info!(
                    gateway = %gateway_name,
                    refund_id = %response.refund_id,
                    status = ?response.status,
                    "Refund accepted by gateway"
                );
                Ok(response)
            }
            Err(e) => {
                error!(gateway = %gateway_name, error = %e, "Refund request failed");
                Err(e)
            }
        }
    }

    pub fn gateway_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.gateways.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for GatewayService {
    fn default() -> Self {
        Self::new()
    }
}
