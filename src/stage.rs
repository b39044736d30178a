//! Stage execution framework.
//!
//! A [`Stage`] is one named unit of work in the remediation graph: it
//! receives a snapshot of the [`WorkflowState`](crate::state::WorkflowState)
//! and returns a [`StageDelta`](crate::state::StageDelta) for the engine to
//! merge. Stages hold their external collaborators (the port trait objects)
//! as constructor-injected `Arc`s, never as process-wide globals.
//!
//! # Error handling
//!
//! A `StageError` is fatal to the run: the engine does not catch it, by
//! design. Recoverable conditions — an invalid artifact, a failed
//! documentation fetch, unparseable structured output — are expressed in
//! the returned delta instead (see the individual stages).

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;
use uuid::Uuid;

use crate::ports::{GeneratorError, ValidatorError};
use crate::state::{StageDelta, WorkflowState};
use crate::types::StageKind;

/// A unit of work in the workflow graph.
///
/// Implementations must be stateless with respect to the run: everything a
/// stage learns goes into the returned delta, and everything it needs comes
/// from the snapshot or its injected ports. The same stage instance may be
/// re-entered many times in one run (the triage loop cycles back through
/// discovery, intelligence, and architect).
#[async_trait]
pub trait Stage: Send + Sync {
    /// Execute this stage against a state snapshot.
    async fn run(
        &self,
        snapshot: WorkflowState,
        ctx: StageContext,
    ) -> Result<StageDelta, StageError>;
}

/// Execution metadata passed to a stage.
#[derive(Clone, Copy, Debug)]
pub struct StageContext {
    /// Identifier of the run this execution belongs to.
    pub run_id: Uuid,
    /// Which stage is being executed.
    pub stage: StageKind,
    /// Zero-based engine step number.
    pub step: u64,
}

impl StageContext {
    /// Emit an info-level event tagged with this execution's metadata.
    pub fn note(&self, message: &str) {
        tracing::info!(
            run_id = %self.run_id,
            stage = %self.stage,
            step = self.step,
            "{message}"
        );
    }
}

/// Fatal stage failure. Propagates out of the engine and aborts the run.
#[derive(Debug, Error, Diagnostic)]
pub enum StageError {
    /// Expected input data is missing from the state snapshot.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(terramend::stage::missing_input),
        help("Check that an earlier stage produced the required field.")
    )]
    MissingInput { what: &'static str },

    /// The generator collaborator failed outright. There is no meaningful
    /// remediation without a generator, so this is process-fatal.
    #[error("generator call failed")]
    #[diagnostic(code(terramend::stage::generator))]
    Generator(#[from] GeneratorError),

    /// The validator collaborator failed at the I/O level (as opposed to
    /// the artifact failing a check, which is a recoverable outcome).
    #[error("validator call failed")]
    #[diagnostic(code(terramend::stage::validator))]
    Validator(#[from] ValidatorError),

    /// JSON serialization error while building a structured payload.
    #[error(transparent)]
    #[diagnostic(code(terramend::stage::serde_json))]
    Serde(#[from] serde_json::Error),
}
