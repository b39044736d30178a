//! Topology validation and compilation into an executable workflow.

use miette::Diagnostic;
use thiserror::Error;

use super::builder::WorkflowBuilder;
use crate::app::Workflow;
use crate::types::{Route, StageKind};

/// Structural problems caught when compiling a graph.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum GraphCompileError {
    #[error("no entry stage configured")]
    #[diagnostic(
        code(terramend::graphs::missing_entry),
        help("Call WorkflowBuilder::with_entry before compile.")
    )]
    MissingEntry,

    #[error("entry stage {entry} is not registered")]
    #[diagnostic(code(terramend::graphs::unregistered_entry))]
    UnregisteredEntry { entry: StageKind },

    #[error("edge from {from} targets unregistered stage {to}")]
    #[diagnostic(
        code(terramend::graphs::unregistered_target),
        help("Register the target stage with add_stage, or remove the edge.")
    )]
    UnregisteredTarget { from: StageKind, to: StageKind },

    #[error("edge declared from unregistered stage {from}")]
    #[diagnostic(code(terramend::graphs::unregistered_source))]
    UnregisteredSource { from: StageKind },

    #[error("stage {stage} has no outgoing edge or router")]
    #[diagnostic(
        code(terramend::graphs::dangling_stage),
        help("Every registered stage needs a successor; add an edge or a router.")
    )]
    DanglingStage { stage: StageKind },
}

impl WorkflowBuilder {
    /// Validates the topology and compiles into an executable [`Workflow`].
    ///
    /// Router destinations cannot be checked here (they are runtime values);
    /// a router that names an unregistered stage surfaces as
    /// [`RunError::UnknownStage`](crate::app::RunError::UnknownStage) during
    /// execution.
    pub fn compile(self) -> Result<Workflow, GraphCompileError> {
        let entry = self.entry.ok_or(GraphCompileError::MissingEntry)?;
        if !self.stages.contains_key(&entry) {
            return Err(GraphCompileError::UnregisteredEntry { entry });
        }

        for (from, successor) in &self.successors {
            if !self.stages.contains_key(from) {
                return Err(GraphCompileError::UnregisteredSource { from: *from });
            }
            if let super::edges::Successor::Fixed(Route::Stage(to)) = successor {
                if !self.stages.contains_key(to) {
                    return Err(GraphCompileError::UnregisteredTarget {
                        from: *from,
                        to: *to,
                    });
                }
            }
        }

        for stage in self.stages.keys() {
            if !self.successors.contains_key(stage) {
                return Err(GraphCompileError::DanglingStage { stage: *stage });
            }
        }

        Ok(Workflow::from_parts(self.stages, self.successors, entry))
    }
}
