//! Routing policy for the remediation graph.
//!
//! Both routers are pure functions over the merged state. They re-derive
//! their decisions from the underlying fields rather than trusting
//! `status` blindly for control flow beyond the success check, and they can
//! only return members of the closed [`Route`] type.

use crate::state::{RemediationTarget, RunStatus, WorkflowState};
use crate::types::{Route, StageKind, Terminal};

/// Retry budget: maximum architect executions per run.
///
/// The ceiling counts syntheses, not validations, and is a single global
/// counter for the whole run regardless of which remediation path triage
/// chooses.
pub const MAX_SYNTHESIS_ATTEMPTS: u32 = 4;

/// Routes after the validate stage.
///
/// Success terminates the run successfully; a failure with the retry budget
/// spent terminates as exhausted (still a failure, never a success);
/// otherwise the failure escalates to triage.
#[must_use]
pub fn decide_after_validate(state: &WorkflowState) -> Route {
    if state.status == RunStatus::Success {
        return Route::Terminal(Terminal::Success);
    }
    if state.retry_count >= MAX_SYNTHESIS_ATTEMPTS {
        tracing::warn!(attempts = state.retry_count, "retry budget exhausted");
        return Route::Terminal(Terminal::Exhausted);
    }
    Route::Stage(StageKind::Triage)
}

/// Routes after the triage stage.
///
/// Maps triage's typed verdict onto the allowed destinations. A verdict
/// that names nothing (`next_node` unset) defaults to the architect — the
/// safe retry path.
#[must_use]
pub fn decide_after_triage(state: &WorkflowState) -> Route {
    match state.next_node {
        Some(RemediationTarget::Abort) => Route::Terminal(Terminal::Aborted),
        Some(RemediationTarget::Discovery) => Route::Stage(StageKind::Discovery),
        Some(RemediationTarget::Intelligence) => Route::Stage(StageKind::Intelligence),
        Some(RemediationTarget::Architect) | None => Route::Stage(StageKind::Architect),
    }
}
