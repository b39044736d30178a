//! Core identifiers for the remediation workflow graph.
//!
//! The workflow topology is closed: every stage the engine can visit is a
//! [`StageKind`] variant, and every way a run can end is a [`Terminal`]
//! variant. Routers return a [`Route`], which is the union of the two, so an
//! "unknown stage name" is unrepresentable rather than a runtime fallback.
//!
//! # Examples
//!
//! ```rust
//! use terramend::types::{Route, StageKind, Terminal};
//!
//! let next = Route::Stage(StageKind::Triage);
//! assert!(!next.is_terminal());
//!
//! let done = Route::Terminal(Terminal::Success);
//! assert!(done.is_terminal());
//! assert_eq!(StageKind::Architect.to_string(), "architect");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a stage in the remediation graph.
///
/// The enumeration is deliberately closed: the graph builder, the engine,
/// and the routers all speak in `StageKind`, so routing decisions are
/// checked at compile time instead of being coerced from strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Gathers reference documentation for the request.
    Discovery,
    /// Fan-out/fan-in over the research and security sub-stages.
    Intelligence,
    /// Synthesizes the candidate artifact.
    Architect,
    /// Checks the artifact structurally and against policy.
    Validate,
    /// Classifies a validation failure and picks the remediation path.
    Triage,
}

impl StageKind {
    /// All stages, in the order they appear on the happy path.
    pub const ALL: [StageKind; 5] = [
        StageKind::Discovery,
        StageKind::Intelligence,
        StageKind::Architect,
        StageKind::Validate,
        StageKind::Triage,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Discovery => "discovery",
            StageKind::Intelligence => "intelligence",
            StageKind::Architect => "architect",
            StageKind::Validate => "validate",
            StageKind::Triage => "triage",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal outcome sentinel.
///
/// Terminals are routing targets, not stages: reaching one stops the engine.
/// The human-observable outcome lives in
/// [`WorkflowState::status`](crate::state::WorkflowState::status), which is
/// written by the stages themselves; the engine never writes state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    /// Artifact produced and validated.
    Success,
    /// Retry budget exhausted without a valid artifact.
    Exhausted,
    /// Triage declared the failure unrecoverable.
    Aborted,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Success => f.write_str("success"),
            Terminal::Exhausted => f.write_str("exhausted"),
            Terminal::Aborted => f.write_str("aborted"),
        }
    }
}

/// Routing decision: continue at a stage, or stop at a terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Stage(StageKind),
    Terminal(Terminal),
}

impl Route {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Route::Terminal(_))
    }
}

impl From<StageKind> for Route {
    fn from(kind: StageKind) -> Self {
        Route::Stage(kind)
    }
}

impl From<Terminal> for Route {
    fn from(terminal: Terminal) -> Self {
        Route::Terminal(terminal)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Stage(kind) => write!(f, "{kind}"),
            Route::Terminal(terminal) => write!(f, "terminal:{terminal}"),
        }
    }
}
