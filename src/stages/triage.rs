//! Triage stage: failure classification and remediation routing.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ports::{GeneratorPort, Role};
use crate::stage::{Stage, StageContext, StageError};
use crate::state::{RemediationTarget, RunStatus, StageDelta, WorkflowState};
use crate::structured::{Degrade, parse_or_degrade};

/// Structured triage verdict expected back from the generator.
///
/// Every field defaults, so a partially-shaped reply still parses; a reply
/// that is not JSON at all degrades via [`Degrade`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TriageReport {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub fix_instructions: String,
    #[serde(default)]
    pub needs_additional_research: bool,
    #[serde(default)]
    pub follow_up_prompt: String,
    #[serde(default)]
    pub should_abort: bool,
}

impl Degrade for TriageReport {
    /// Conservative fallback: the raw text becomes both the summary and the
    /// fix instructions, and the run retries the architect.
    fn degrade(raw: &str) -> Self {
        TriageReport {
            summary: raw.to_string(),
            fix_instructions: raw.to_string(),
            ..TriageReport::default()
        }
    }
}

impl TriageReport {
    /// Decision rule, in priority order: abort, then re-research, then
    /// retry the architect.
    #[must_use]
    pub fn decision(&self) -> (RemediationTarget, RunStatus) {
        if self.should_abort {
            (RemediationTarget::Abort, RunStatus::Aborted)
        } else if self.needs_additional_research {
            (RemediationTarget::Discovery, RunStatus::Retry)
        } else {
            (RemediationTarget::Architect, RunStatus::Retry)
        }
    }
}

/// Classifies the most recent validation failure and decides the
/// remediation path.
pub struct TriageStage {
    generator: Arc<dyn GeneratorPort>,
}

impl TriageStage {
    pub fn new(generator: Arc<dyn GeneratorPort>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Stage for TriageStage {
    async fn run(
        &self,
        snapshot: WorkflowState,
        ctx: StageContext,
    ) -> Result<StageDelta, StageError> {
        ctx.note("classifying validation failure");
        let error = if snapshot.error.is_empty() {
            "Unknown failure"
        } else {
            &snapshot.error
        };
        let payload = serde_json::json!({
            "request": snapshot.request,
            "error": error,
            "recent_code": snapshot.code,
        });

        let raw = self
            .generator
            .generate(Role::Triage, &payload.to_string())
            .await?;
        let report: TriageReport = parse_or_degrade(&raw);
        let (target, status) = report.decision();
        tracing::info!(target = ?target, "triage verdict");

        Ok(StageDelta::new()
            .with_diagnosis(report.summary)
            .with_fix_instructions(report.fix_instructions)
            .with_follow_up_prompt(report.follow_up_prompt)
            .with_next_node(target)
            .with_status(status))
    }
}
