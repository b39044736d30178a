//! The assembled remediation workflow.
//!
//! Wires the five stages, the happy-path edges, and the two routers into a
//! compiled graph, and exposes the single run entry point.

use std::sync::Arc;

use crate::app::{RunError, Workflow};
use crate::config::Settings;
use crate::graphs::{GraphCompileError, WorkflowBuilder};
use crate::ports::{
    DiscoveryPort, GeneratorPort, OpenAiGenerator, TerraformValidator, ValidatorPort, WebDiscovery,
};
use crate::routing::{decide_after_triage, decide_after_validate};
use crate::stages::{
    ArchitectStage, DiscoveryStage, IntelligenceStage, TriageStage, ValidateStage,
};
use crate::state::WorkflowState;
use crate::types::StageKind;

/// Documentation domain discovery is scoped to by default.
pub const DEFAULT_DOC_DOMAIN: &str = "registry.terraform.io";

/// A ready-to-run remediation workflow.
///
/// Topology: discovery → intelligence → architect → validate, with validate
/// routing to a terminal or to triage, and triage routing back into
/// discovery, intelligence, or architect — or aborting.
///
/// All collaborators are injected; the workflow holds no global state and
/// independent instances can run concurrently (give each its own validator
/// workdir).
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use terramend::config::Settings;
/// use terramend::workflow::RemediationWorkflow;
///
/// # async fn example() -> miette::Result<()> {
/// let settings = Settings::from_env()?;
/// let workflow = RemediationWorkflow::from_settings(&settings)?;
/// let outcome = workflow.run("Create an AWS S3 bucket named 'demo'").await?;
/// println!("{:?}: {}", outcome.status, outcome.code);
/// # Ok(())
/// # }
/// ```
pub struct RemediationWorkflow {
    workflow: Workflow,
}

impl RemediationWorkflow {
    /// Assembles the workflow from injected ports, scoped to the default
    /// documentation domain.
    pub fn new(
        generator: Arc<dyn GeneratorPort>,
        validator: Arc<dyn ValidatorPort>,
        discovery: Arc<dyn DiscoveryPort>,
    ) -> Result<Self, GraphCompileError> {
        Self::with_domain(generator, validator, discovery, DEFAULT_DOC_DOMAIN)
    }

    /// Assembles the workflow with a custom documentation domain.
    pub fn with_domain(
        generator: Arc<dyn GeneratorPort>,
        validator: Arc<dyn ValidatorPort>,
        discovery: Arc<dyn DiscoveryPort>,
        doc_domain: impl Into<String>,
    ) -> Result<Self, GraphCompileError> {
        let workflow = WorkflowBuilder::new()
            .add_stage(
                StageKind::Discovery,
                DiscoveryStage::new(generator.clone(), discovery, doc_domain),
            )
            .add_stage(
                StageKind::Intelligence,
                IntelligenceStage::new(generator.clone()),
            )
            .add_stage(StageKind::Architect, ArchitectStage::new(generator.clone()))
            .add_stage(StageKind::Validate, ValidateStage::new(validator))
            .add_stage(StageKind::Triage, TriageStage::new(generator))
            .with_entry(StageKind::Discovery)
            .add_edge(StageKind::Discovery, StageKind::Intelligence)
            .add_edge(StageKind::Intelligence, StageKind::Architect)
            .add_edge(StageKind::Architect, StageKind::Validate)
            .add_router(StageKind::Validate, Arc::new(decide_after_validate))
            .add_router(StageKind::Triage, Arc::new(decide_after_triage))
            .compile()?;
        Ok(Self { workflow })
    }

    /// Assembles the production workflow from environment-driven settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, GraphCompileError> {
        let generator = Arc::new(
            OpenAiGenerator::new(&settings.endpoint, &settings.api_key, &settings.model)
                .with_temperature(settings.temperature),
        );
        let validator = Arc::new(TerraformValidator::new(&settings.workdir));
        let discovery = Arc::new(WebDiscovery::new());
        Self::with_domain(generator, validator, discovery, settings.doc_domain.clone())
    }

    /// Runs the workflow for one request and returns the terminal state.
    ///
    /// Inspect [`status`](crate::state::WorkflowState::status) and
    /// [`code`](crate::state::WorkflowState::code) on the result for the
    /// outcome.
    pub async fn run(&self, request: impl Into<String>) -> Result<WorkflowState, RunError> {
        self.workflow.run(WorkflowState::new(request)).await
    }

    /// The underlying compiled graph.
    #[must_use]
    pub fn graph(&self) -> &Workflow {
        &self.workflow
    }
}
