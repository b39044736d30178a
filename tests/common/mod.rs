#![allow(dead_code)]

mod ports;

pub use ports::*;

use async_trait::async_trait;
use terramend::stage::{Stage, StageContext, StageError};
use terramend::state::{StageDelta, WorkflowState};
use terramend::types::StageKind;
use uuid::Uuid;

/// Stage that does nothing; useful for topology tests.
#[derive(Debug, Clone)]
pub struct NoopStage;

#[async_trait]
impl Stage for NoopStage {
    async fn run(
        &self,
        _snapshot: WorkflowState,
        _ctx: StageContext,
    ) -> Result<StageDelta, StageError> {
        Ok(StageDelta::new())
    }
}

/// Fresh execution context for driving a stage directly.
pub fn ctx(stage: StageKind) -> StageContext {
    StageContext {
        run_id: Uuid::new_v4(),
        stage,
        step: 0,
    }
}
