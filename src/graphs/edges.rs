//! Edge types and routing functions.

use std::sync::Arc;

use crate::state::WorkflowState;
use crate::types::Route;

/// Pure routing function evaluated over the state *after* the source
/// stage's delta has been merged.
///
/// Routers return the closed [`Route`] type, so they can only name a
/// registered-or-terminal destination; there is no string fallback path.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use terramend::graphs::Router;
/// use terramend::state::RunStatus;
/// use terramend::types::{Route, StageKind, Terminal};
///
/// let after_check: Router = Arc::new(|state| {
///     if state.status == RunStatus::Success {
///         Route::Terminal(Terminal::Success)
///     } else {
///         Route::Stage(StageKind::Triage)
///     }
/// });
/// ```
pub type Router = Arc<dyn Fn(&WorkflowState) -> Route + Send + Sync + 'static>;

/// What follows a stage: a fixed destination or a router.
#[derive(Clone)]
pub enum Successor {
    /// Unconditional edge.
    Fixed(Route),
    /// State-dependent routing.
    Conditional(Router),
}

impl std::fmt::Debug for Successor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Successor::Fixed(route) => f.debug_tuple("Fixed").field(route).finish(),
            Successor::Conditional(_) => f.write_str("Conditional(..)"),
        }
    }
}
