//! The graph execution engine.
//!
//! A compiled [`Workflow`] drives one run at a time: starting at the entry
//! stage it repeatedly snapshots the state, executes the current stage,
//! merges the returned delta, and follows the stage's successor — a fixed
//! edge or a router evaluated over the merged state — until a terminal
//! sentinel is reached.
//!
//! The engine is the exclusive owner of the [`WorkflowState`] for the
//! duration of a run; stages only ever see clones. It never writes state
//! itself: terminal status is whatever the last stage recorded.
//!
//! Stage failures (a generator or validator collaborator erroring outright)
//! are **not** caught here; they propagate as [`RunError`] and abort the
//! run. This is deliberate: there is no meaningful remediation path without
//! the collaborators.

use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::graphs::Successor;
use crate::stage::{Stage, StageContext, StageError};
use crate::state::WorkflowState;
use crate::types::{Route, StageKind};

/// A compiled, executable workflow graph.
///
/// Construct via [`WorkflowBuilder`](crate::graphs::WorkflowBuilder). The
/// graph is immutable after compilation and can be shared across tasks;
/// each [`run`](Self::run) owns its state independently.
pub struct Workflow {
    stages: FxHashMap<StageKind, Arc<dyn Stage>>,
    successors: FxHashMap<StageKind, Successor>,
    entry: StageKind,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("stages", &self.stages.keys().collect::<Vec<_>>())
            .field("successors", &self.successors)
            .field("entry", &self.entry)
            .finish()
    }
}

/// Fatal run failure.
#[derive(Debug, Error, Diagnostic)]
pub enum RunError {
    /// A stage (or the collaborator behind it) failed outright.
    #[error("stage {stage} failed")]
    #[diagnostic(code(terramend::app::stage_failed))]
    Stage {
        stage: StageKind,
        #[source]
        #[diagnostic_source]
        source: StageError,
    },

    /// A router named a stage that is not registered in this graph.
    #[error("router selected unregistered stage {stage}")]
    #[diagnostic(
        code(terramend::app::unknown_stage),
        help("Register the stage with WorkflowBuilder::add_stage.")
    )]
    UnknownStage { stage: StageKind },

    /// A stage without a successor was reached. Compilation prevents this
    /// for well-formed graphs; kept as an error rather than a panic.
    #[error("stage {stage} has no successor")]
    #[diagnostic(code(terramend::app::no_successor))]
    NoSuccessor { stage: StageKind },
}

impl Workflow {
    pub(crate) fn from_parts(
        stages: FxHashMap<StageKind, Arc<dyn Stage>>,
        successors: FxHashMap<StageKind, Successor>,
        entry: StageKind,
    ) -> Self {
        Self {
            stages,
            successors,
            entry,
        }
    }

    #[must_use]
    pub fn entry(&self) -> StageKind {
        self.entry
    }

    #[must_use]
    pub fn stages(&self) -> &FxHashMap<StageKind, Arc<dyn Stage>> {
        &self.stages
    }

    #[must_use]
    pub fn successors(&self) -> &FxHashMap<StageKind, Successor> {
        &self.successors
    }

    /// Executes one run to a terminal and returns the final state.
    ///
    /// Cycles are expected; termination is the routers' responsibility
    /// (the remediation routers guarantee it via the retry budget).
    pub async fn run(&self, mut state: WorkflowState) -> Result<WorkflowState, RunError> {
        let run_id = Uuid::new_v4();
        let mut current = self.entry;
        let mut step: u64 = 0;
        tracing::info!(%run_id, entry = %current, "workflow run starting");

        loop {
            let stage = self
                .stages
                .get(&current)
                .ok_or(RunError::UnknownStage { stage: current })?;
            let ctx = StageContext {
                run_id,
                stage: current,
                step,
            };

            let delta = stage
                .run(state.clone(), ctx)
                .await
                .map_err(|source| RunError::Stage {
                    stage: current,
                    source,
                })?;
            delta.apply(&mut state);

            let route = match self.successors.get(&current) {
                Some(Successor::Fixed(route)) => *route,
                Some(Successor::Conditional(router)) => router(&state),
                None => return Err(RunError::NoSuccessor { stage: current }),
            };
            tracing::debug!(%run_id, from = %current, to = %route, step, "routing");

            match route {
                Route::Terminal(terminal) => {
                    tracing::info!(
                        %run_id,
                        %terminal,
                        status = ?state.status,
                        attempts = state.retry_count,
                        "workflow run finished"
                    );
                    return Ok(state);
                }
                Route::Stage(next) => {
                    current = next;
                    step += 1;
                }
            }
        }
    }
}
