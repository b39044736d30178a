//! Intelligence stage: concurrent research and security sub-stages.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future;

use crate::ports::{GeneratorPort, Role};
use crate::stage::{Stage, StageContext, StageError};
use crate::state::{StageDelta, WorkflowState};

/// Fan-out/fan-in over the research and security sub-stages.
///
/// Both sub-calls run concurrently against the identical snapshot and a
/// shared context string, then the results are merged into disjoint state
/// fields (research first, security second; the order has no semantic
/// effect). The one-shot `follow_up_prompt` is consumed here: the delta
/// clears it so a triage follow-up feeds exactly one intelligence run.
pub struct IntelligenceStage {
    generator: Arc<dyn GeneratorPort>,
}

impl IntelligenceStage {
    pub fn new(generator: Arc<dyn GeneratorPort>) -> Self {
        Self { generator }
    }
}

/// Context shared verbatim by both sub-calls.
fn shared_context(snapshot: &WorkflowState) -> String {
    let mut context = format!("User wants: {}", snapshot.request);
    if !snapshot.follow_up_prompt.is_empty() {
        context.push_str("\nAdditional context from triage: ");
        context.push_str(&snapshot.follow_up_prompt);
    }
    if !snapshot.documentation_snippets.is_empty() {
        context.push_str("\nDocumentation context:\n");
        context.push_str(&snapshot.documentation_snippets);
    }
    context
}

#[async_trait]
impl Stage for IntelligenceStage {
    async fn run(
        &self,
        snapshot: WorkflowState,
        ctx: StageContext,
    ) -> Result<StageDelta, StageError> {
        ctx.note("fanning out research and security sub-stages");
        let context = shared_context(&snapshot);

        let (syntax_guide, security_policy) = future::try_join(
            self.generator.generate(Role::Researcher, &context),
            self.generator.generate(Role::Security, &context),
        )
        .await?;

        Ok(StageDelta::new()
            .with_syntax_guide(syntax_guide)
            .with_security_policy(security_policy)
            .with_follow_up_prompt(String::new()))
    }
}
