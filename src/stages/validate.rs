//! Validate stage: structural check, then policy check.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::ValidatorPort;
use crate::stage::{Stage, StageContext, StageError};
use crate::state::{RunStatus, StageDelta, WorkflowState};

/// Checks the candidate artifact with two ordered, independent checks,
/// short-circuiting on the first failure.
///
/// The stage holds no mutable check state: validating the same artifact
/// twice without an intervening synthesis yields the same result. It never
/// touches `retry_count`.
pub struct ValidateStage {
    validator: Arc<dyn ValidatorPort>,
}

impl ValidateStage {
    pub fn new(validator: Arc<dyn ValidatorPort>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl Stage for ValidateStage {
    async fn run(
        &self,
        snapshot: WorkflowState,
        ctx: StageContext,
    ) -> Result<StageDelta, StageError> {
        ctx.note("validating artifact");
        if snapshot.code.is_empty() {
            return Ok(StageDelta::new()
                .with_error("no code generated")
                .with_status(RunStatus::Failed));
        }

        self.validator.persist(&snapshot.code).await?;

        let structure = self.validator.check_structure(&snapshot.code).await?;
        if !structure.passed {
            tracing::warn!(attempt = snapshot.retry_count, "structural check failed");
            return Ok(StageDelta::new()
                .with_error(structure.diagnostic)
                .with_status(RunStatus::Failed));
        }

        let policy = self.validator.check_policy(&snapshot.code).await?;
        if !policy.passed {
            tracing::warn!(attempt = snapshot.retry_count, "policy check failed");
            return Ok(StageDelta::new()
                .with_error(policy.diagnostic)
                .with_status(RunStatus::Failed));
        }
        if policy.skipped {
            tracing::info!("policy checker unavailable; artifact waved through");
        }

        Ok(StageDelta::new()
            .with_error(String::new())
            .with_status(RunStatus::Success))
    }
}
