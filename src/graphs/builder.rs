//! Fluent builder for workflow graphs.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::edges::{Router, Successor};
use crate::stage::Stage;
use crate::types::{Route, StageKind};

/// Builder for a remediation workflow graph.
///
/// Register each stage once, set the entry stage, and give every stage a
/// successor: [`add_edge`](Self::add_edge) for a fixed next stage or
/// [`add_router`](Self::add_router) for state-dependent routing (including
/// routing to terminals). [`compile`](Self::compile) validates the topology
/// and produces the executable [`Workflow`](crate::app::Workflow).
pub struct WorkflowBuilder {
    pub(super) stages: FxHashMap<StageKind, Arc<dyn Stage>>,
    pub(super) successors: FxHashMap<StageKind, Successor>,
    pub(super) entry: Option<StageKind>,
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: FxHashMap::default(),
            successors: FxHashMap::default(),
            entry: None,
        }
    }

    /// Registers a stage implementation under its identifier.
    ///
    /// Registering the same kind twice replaces the earlier implementation.
    #[must_use]
    pub fn add_stage(mut self, kind: StageKind, stage: impl Stage + 'static) -> Self {
        self.stages.insert(kind, Arc::new(stage));
        self
    }

    /// Adds an unconditional edge: after `from` completes, run `to`.
    #[must_use]
    pub fn add_edge(mut self, from: StageKind, to: StageKind) -> Self {
        self.successors
            .insert(from, Successor::Fixed(Route::Stage(to)));
        self
    }

    /// Adds a conditional edge: after `from` completes, evaluate `router`
    /// over the merged state to choose the next stage or a terminal.
    #[must_use]
    pub fn add_router(mut self, from: StageKind, router: Router) -> Self {
        self.successors.insert(from, Successor::Conditional(router));
        self
    }

    /// Sets the entry stage.
    #[must_use]
    pub fn with_entry(mut self, entry: StageKind) -> Self {
        self.entry = Some(entry);
        self
    }
}
