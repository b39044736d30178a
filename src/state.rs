//! Workflow state: the single record threaded through every stage.
//!
//! One run owns exactly one [`WorkflowState`]. Stages receive a snapshot
//! (a clone) and return a [`StageDelta`]; the engine merges the delta with
//! shallow field overwrite, so a field absent from the delta is preserved
//! unchanged. The state lives for the duration of one run and is dropped
//! when the run terminates; nothing is persisted across runs.
//!
//! Two text fields use the empty string as the "not set" sentinel rather
//! than `Option`: [`WorkflowState::error`] (cleared by a successful
//! validation) and [`WorkflowState::follow_up_prompt`] (a one-shot value
//! consumed and cleared by the intelligence stage).
//!
//! # Examples
//!
//! ```rust
//! use terramend::state::{RunStatus, StageDelta, WorkflowState};
//!
//! let mut state = WorkflowState::new("Create an S3 bucket");
//! assert_eq!(state.status, RunStatus::Running);
//! assert_eq!(state.retry_count, 0);
//!
//! let delta = StageDelta::new()
//!     .with_code("resource \"aws_s3_bucket\" \"b\" {}")
//!     .with_retry_count(1);
//! delta.apply(&mut state);
//!
//! assert_eq!(state.retry_count, 1);
//! // Fields absent from the delta are untouched.
//! assert_eq!(state.request, "Create an S3 bucket");
//! ```

use serde::{Deserialize, Serialize};

/// Externally observable run status.
///
/// Written by the validate and triage stages; routers re-derive their
/// decisions from the underlying fields, so the status drives no control
/// flow on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Running,
    Success,
    Failed,
    Retry,
    Aborted,
}

/// Remediation path chosen by the triage stage.
///
/// This is the only place a generator's output can influence routing, and it
/// is already typed by the time the router sees it: a triage report that
/// names nothing usable leaves `next_node` unset, and the router treats
/// that as [`Architect`](RemediationTarget::Architect).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationTarget {
    Architect,
    Intelligence,
    Discovery,
    Abort,
}

/// The state record threaded through the workflow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// The user's goal. Immutable after initialization.
    pub request: String,
    /// Syntax cheat sheet from the research sub-stage. `""` until produced.
    pub syntax_guide: String,
    /// Security constraints from the security sub-stage. `""` until produced.
    pub security_policy: String,
    /// Most recent synthesized artifact; overwritten whole by every
    /// architect run. No history is kept.
    pub code: String,
    /// Diagnostic text from the last failed validation. `""` when clear.
    pub error: String,
    /// Number of architect executions so far. Monotonically non-decreasing;
    /// only the architect stage increments it.
    pub retry_count: u32,
    /// Observable outcome; see [`RunStatus`].
    pub status: RunStatus,
    /// Triage's summary of the most recent failure.
    pub diagnosis: Option<String>,
    /// Triage's concrete guidance for the next architect run.
    pub fix_instructions: Option<String>,
    /// One-shot extra context for the research/security sub-stages;
    /// consumed and cleared by the intelligence stage.
    pub follow_up_prompt: String,
    /// Routing decision written by triage, read once by the router.
    pub next_node: Option<RemediationTarget>,
    /// URLs collected by discovery, in collection order.
    pub documentation_urls: Vec<String>,
    /// Summarized (or raw) documentation excerpts from discovery.
    pub documentation_snippets: String,
}

impl WorkflowState {
    /// Creates the initial state for a run: the request plus empty/zero
    /// defaults, status [`RunStatus::Running`].
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            ..Self::default()
        }
    }

    /// `true` while the last validation's diagnostic is still standing.
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

/// Partial state update returned by a stage.
///
/// Every field is optional; `None` means "leave unchanged". Mirrors the
/// writable surface of [`WorkflowState`] minus `request`, which no stage may
/// write.
#[derive(Clone, Debug, Default)]
pub struct StageDelta {
    pub syntax_guide: Option<String>,
    pub security_policy: Option<String>,
    pub code: Option<String>,
    /// `Some("")` clears a standing diagnostic.
    pub error: Option<String>,
    /// Absolute new value, computed by the stage from its snapshot.
    pub retry_count: Option<u32>,
    pub status: Option<RunStatus>,
    pub diagnosis: Option<String>,
    pub fix_instructions: Option<String>,
    /// `Some("")` consumes the one-shot follow-up.
    pub follow_up_prompt: Option<String>,
    pub next_node: Option<RemediationTarget>,
    pub documentation_urls: Option<Vec<String>>,
    pub documentation_snippets: Option<String>,
}

impl StageDelta {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_syntax_guide(mut self, text: impl Into<String>) -> Self {
        self.syntax_guide = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_security_policy(mut self, text: impl Into<String>) -> Self {
        self.security_policy = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_error(mut self, diagnostic: impl Into<String>) -> Self {
        self.error = Some(diagnostic.into());
        self
    }

    #[must_use]
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_diagnosis(mut self, text: impl Into<String>) -> Self {
        self.diagnosis = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_fix_instructions(mut self, text: impl Into<String>) -> Self {
        self.fix_instructions = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_follow_up_prompt(mut self, text: impl Into<String>) -> Self {
        self.follow_up_prompt = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_next_node(mut self, target: RemediationTarget) -> Self {
        self.next_node = Some(target);
        self
    }

    #[must_use]
    pub fn with_documentation_urls(mut self, urls: Vec<String>) -> Self {
        self.documentation_urls = Some(urls);
        self
    }

    #[must_use]
    pub fn with_documentation_snippets(mut self, text: impl Into<String>) -> Self {
        self.documentation_snippets = Some(text.into());
        self
    }

    /// Merges this delta into `state`: present fields overwrite, absent
    /// fields are preserved.
    pub fn apply(self, state: &mut WorkflowState) {
        if let Some(v) = self.syntax_guide {
            state.syntax_guide = v;
        }
        if let Some(v) = self.security_policy {
            state.security_policy = v;
        }
        if let Some(v) = self.code {
            state.code = v;
        }
        if let Some(v) = self.error {
            state.error = v;
        }
        if let Some(v) = self.retry_count {
            state.retry_count = v;
        }
        if let Some(v) = self.status {
            state.status = v;
        }
        if let Some(v) = self.diagnosis {
            state.diagnosis = Some(v);
        }
        if let Some(v) = self.fix_instructions {
            state.fix_instructions = Some(v);
        }
        if let Some(v) = self.follow_up_prompt {
            state.follow_up_prompt = v;
        }
        if let Some(v) = self.next_node {
            state.next_node = Some(v);
        }
        if let Some(v) = self.documentation_urls {
            state.documentation_urls = v;
        }
        if let Some(v) = self.documentation_snippets {
            state.documentation_snippets = v;
        }
    }
}
