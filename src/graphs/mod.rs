//! Workflow graph definition and compilation.
//!
//! [`WorkflowBuilder`] assembles stages, fixed edges, and routers with a
//! fluent API, then compiles into an executable
//! [`Workflow`](crate::app::Workflow). Compilation validates the topology:
//! an entry stage must be set and registered, fixed edges must target
//! registered stages, and every registered stage must have a successor
//! (either a fixed edge or a router).
//!
//! Cycles are allowed and expected: the triage stage routes back into
//! discovery, intelligence, and architect.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use terramend::graphs::WorkflowBuilder;
//! use terramend::types::{Route, StageKind, Terminal};
//! # use async_trait::async_trait;
//! # use terramend::stage::{Stage, StageContext, StageError};
//! # use terramend::state::{StageDelta, WorkflowState};
//! # struct NoopStage;
//! # #[async_trait]
//! # impl Stage for NoopStage {
//! #     async fn run(&self, _: WorkflowState, _: StageContext) -> Result<StageDelta, StageError> {
//! #         Ok(StageDelta::new())
//! #     }
//! # }
//!
//! let workflow = WorkflowBuilder::new()
//!     .add_stage(StageKind::Architect, NoopStage)
//!     .add_stage(StageKind::Validate, NoopStage)
//!     .with_entry(StageKind::Architect)
//!     .add_edge(StageKind::Architect, StageKind::Validate)
//!     .add_router(StageKind::Validate, Arc::new(|_state| {
//!         Route::Terminal(Terminal::Success)
//!     }))
//!     .compile()
//!     .expect("valid topology");
//! ```

mod builder;
mod compilation;
mod edges;

pub use builder::WorkflowBuilder;
pub use compilation::GraphCompileError;
pub use edges::{Router, Successor};
