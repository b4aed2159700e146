use std::sync::Arc;

use crate::core::{AppError, Result};
use crate::modules::policies::models::{BookingPolicySetting, PolicyRequest};
use crate::modules::policies::repositories::PolicyRepository;

pub struct PolicyService {
    repo: Arc<dyn PolicyRepository>,
}

impl PolicyService {
    pub fn new(repo: Arc<dyn PolicyRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_policy(&self, request: PolicyRequest) -> Result<BookingPolicySetting> {
        let policy = BookingPolicySetting::new(request)?;
        self.repo.create(&policy).await?;

        tracing::info!(
            policy_id = ?policy.id,
            cancellation_policy = %policy.cancellation_policy,
            "Booking policy created"
        );
        Ok(policy)
    }

    pub async fn get_policy(&self, id: &str) -> Result<BookingPolicySetting> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Policy '{}' not found", id)))
    }

    /// Edits apply to every booking that references the policy, including
    /// cancelled ones picked up by the next recalculation run
    pub async fn update_policy(
        &self,
        id: &str,
        request: PolicyRequest,
    ) -> Result<BookingPolicySetting> {
        let mut policy = self.get_policy(id).await?;
        policy.apply(request)?;
        self.repo.update(&policy).await?;
        Ok(policy)
    }

    pub async fn delete_policy(&self, id: &str) -> Result<()> {
        let policy = self.get_policy(id).await?;
        if policy.is_active {
            return Err(AppError::conflict(
                "The active policy cannot be deleted; activate another one first",
            ));
        }

        self.repo.delete(id).await?;
        tracing::info!(policy_id = %id, "Booking policy deleted");
        Ok(())
    }

    pub async fn list_policies(&self) -> Result<Vec<BookingPolicySetting>> {
        self.repo.list().await
    }

    pub async fn activate_policy(&self, id: &str) -> Result<BookingPolicySetting> {
        self.repo.activate(id).await?;
        tracing::info!(policy_id = %id, "Booking policy activated");
        self.get_policy(id).await
    }

    pub async fn get_active(&self) -> Result<Option<BookingPolicySetting>> {
        self.repo.find_active().await
    }

    /// Policy governing a booking: its own snapshot, else the active one.
    /// `None` means no policy applies at all.
    pub async fn resolve_for_booking(
        &self,
        policy_id: Option<&str>,
    ) -> Result<Option<BookingPolicySetting>> {
        if let Some(id) = policy_id {
            if let Some(policy) = self.repo.find_by_id(id).await? {
                return Ok(Some(policy));
            }
            tracing::warn!(policy_id = %id, "Booking references a missing policy, using active policy");
        }

        self.repo.find_active().await
    }
}
