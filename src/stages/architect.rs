//! Architect stage: synthesizes the candidate artifact.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::{GeneratorPort, Role};
use crate::stage::{Stage, StageContext, StageError};
use crate::state::{StageDelta, WorkflowState};
use crate::utils::strip_code_fences;

/// Synthesizes the artifact from the accumulated context.
///
/// This is the only stage that increments `retry_count`: the retry budget
/// counts synthesis attempts, not validations.
pub struct ArchitectStage {
    generator: Arc<dyn GeneratorPort>,
}

impl ArchitectStage {
    pub fn new(generator: Arc<dyn GeneratorPort>) -> Self {
        Self { generator }
    }
}

fn composite_prompt(snapshot: &WorkflowState) -> String {
    let syntax_guide = if snapshot.syntax_guide.is_empty() {
        "No syntax guide provided"
    } else {
        &snapshot.syntax_guide
    };
    let security_policy = if snapshot.security_policy.is_empty() {
        "No security policy provided"
    } else {
        &snapshot.security_policy
    };
    let errors = if snapshot.error.is_empty() {
        "None"
    } else {
        &snapshot.error
    };

    let mut prompt = format!(
        "Request: {}\n\n[RESEARCHER'S SYNTAX GUIDE]\n{}\n\n[CISO'S SECURITY POLICY]\n{}\n\nErrors to fix (if any): {}",
        snapshot.request, syntax_guide, security_policy, errors,
    );
    if let Some(diagnosis) = &snapshot.diagnosis {
        let _ = write!(prompt, "\n\n[TRIAGE SUMMARY]\n{diagnosis}");
    }
    if let Some(fix) = &snapshot.fix_instructions {
        let _ = write!(prompt, "\n\n[TRIAGE PLAYBOOK]\n{fix}");
    }
    prompt
}

#[async_trait]
impl Stage for ArchitectStage {
    async fn run(
        &self,
        snapshot: WorkflowState,
        ctx: StageContext,
    ) -> Result<StageDelta, StageError> {
        ctx.note("synthesizing artifact from research and policy");
        let prompt = composite_prompt(&snapshot);
        let raw = self.generator.generate(Role::Architect, &prompt).await?;
        let code = strip_code_fences(&raw);

        Ok(StageDelta::new()
            .with_code(code)
            .with_retry_count(snapshot.retry_count + 1))
    }
}
