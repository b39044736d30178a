//! External collaborator ports.
//!
//! The workflow core never talks to a model endpoint, a checker binary, or
//! a search backend directly; it talks to these traits. Concrete
//! implementations live in the submodules ([`OpenAiGenerator`],
//! [`TerraformValidator`], [`WebDiscovery`]) and are injected into the
//! stages at construction time, so every run can own an isolated set of
//! collaborators and tests can substitute doubles.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

mod discovery;
mod generator;
mod validator;

pub use discovery::{FETCH_TIMEOUT, WebDiscovery};
pub use generator::OpenAiGenerator;
pub use validator::TerraformValidator;

const RESEARCHER_INSTRUCTIONS: &str = "\
You are the Terraform Knowledge Base.
Goal: Provide the EXACT Terraform AWS v5 syntax for the requested resources.
OUTPUT: A cheat sheet of valid resource blocks.
RULES:
1. Do NOT write the full code. Just the resource skeletons.
2. Emphasize SEPARATE resources for versioning, encryption, and public access blocks.";

const SECURITY_INSTRUCTIONS: &str = "\
You are the Chief Information Security Officer (CISO).
Goal: List the security constraints for the requested infrastructure.
OUTPUT: A bulleted list of requirements (e.g., \"Must have SSE-KMS\", \"Must block public ACLs\").";

const ARCHITECT_INSTRUCTIONS: &str = "\
You are a Lead Cloud Architect.
Goal: Write the final executable Terraform code.
INPUTS:
1. Syntax Guide (from Researcher)
2. Security Policy (from CISO)

INSTRUCTIONS:
- Combine the Syntax Guide and Security Policy to write the code.
- Output ONLY the HCL code. No markdown.";

const TRIAGE_INSTRUCTIONS: &str = "\
You are the DevOps Site Reliability Engineer on-call.
You receive Terraform validation or Checkov security failures from downstream tools.
Analyze the failure and respond in strict JSON with the following keys:
- summary: short description of root cause.
- fix_instructions: concrete steps the architect should take to resolve the issue.
- needs_additional_research: true/false depending on whether we must gather more context (e.g., missing provider, variables, or policies).
- follow_up_prompt: extra context or clarifying questions the researcher/security agents should consider if more research is required. Can be empty.
- should_abort: true/false if the error is unrecoverable.";

const DISCOVERY_INSTRUCTIONS: &str = "\
You are a research assistant that reads authoritative documentation snippets.
Given terraform doc excerpts, summarize key configuration requirements and surface canonical resource names.
Return a concise bulleted list that the researcher and security agents can reference.";

/// Generation role: selects the instruction set a generator call runs under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Produces the syntax cheat sheet.
    Researcher,
    /// Produces the security constraint list.
    Security,
    /// Synthesizes the artifact.
    Architect,
    /// Classifies failures; expected to return structured JSON.
    Triage,
    /// Summarizes fetched documentation excerpts.
    Discovery,
}

impl Role {
    /// The system instruction set for this role.
    #[must_use]
    pub fn instructions(&self) -> &'static str {
        match self {
            Role::Researcher => RESEARCHER_INSTRUCTIONS,
            Role::Security => SECURITY_INSTRUCTIONS,
            Role::Architect => ARCHITECT_INSTRUCTIONS,
            Role::Triage => TRIAGE_INSTRUCTIONS,
            Role::Discovery => DISCOVERY_INSTRUCTIONS,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Researcher => "researcher",
            Role::Security => "security",
            Role::Architect => "architect",
            Role::Triage => "triage",
            Role::Discovery => "discovery",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text generation collaborator.
///
/// Callers must be prepared for output wrapped in decorative markup (the
/// architect strips code fences) and, where structured output is expected,
/// must treat parse failure as recoverable
/// (see [`parse_or_degrade`](crate::structured::parse_or_degrade)).
#[async_trait]
pub trait GeneratorPort: Send + Sync {
    /// Produce text for `role` from the given context.
    async fn generate(&self, role: Role, context: &str) -> Result<String, GeneratorError>;
}

/// Outcome of one validator check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckReport {
    /// Whether the artifact passed this check.
    pub passed: bool,
    /// `true` when the checker was unavailable and the check was waved
    /// through. A skipped check always reports `passed`.
    pub skipped: bool,
    /// Human-readable detail; empty on a clean pass.
    pub diagnostic: String,
}

impl CheckReport {
    #[must_use]
    pub fn pass() -> Self {
        Self {
            passed: true,
            skipped: false,
            diagnostic: String::new(),
        }
    }

    #[must_use]
    pub fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            passed: false,
            skipped: false,
            diagnostic: diagnostic.into(),
        }
    }

    /// A checker that is not installed is reported as "pass, skip" rather
    /// than failing the run.
    #[must_use]
    pub fn skipped(tool: &str) -> Self {
        Self {
            passed: true,
            skipped: true,
            diagnostic: format!("{tool} not available; check skipped"),
        }
    }
}

/// Artifact validation collaborator: one sink plus two independent checks.
#[async_trait]
pub trait ValidatorPort: Send + Sync {
    /// Write the artifact to the external validation surface.
    async fn persist(&self, artifact: &str) -> Result<(), ValidatorError>;

    /// Structural validity check (e.g. `terraform validate`).
    async fn check_structure(&self, artifact: &str) -> Result<CheckReport, ValidatorError>;

    /// Policy compliance check (e.g. `checkov`).
    async fn check_policy(&self, artifact: &str) -> Result<CheckReport, ValidatorError>;
}

/// One search result from the discovery backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
}

/// Documentation discovery collaborator.
///
/// Every operation here is best-effort from the workflow's point of view:
/// the discovery stage recovers from any of these errors with a degraded
/// result instead of surfacing them.
#[async_trait]
pub trait DiscoveryPort: Send + Sync {
    /// Search for documents matching `query`, keeping only results on
    /// `domain_filter`, up to `max_results`.
    async fn search(
        &self,
        query: &str,
        domain_filter: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, DiscoveryError>;

    /// Fetch one document body as plain text. Bounded by a short timeout.
    async fn fetch(&self, url: &str) -> Result<String, DiscoveryError>;
}

/// Generator collaborator failure. Not recovered by the workflow.
#[derive(Debug, Error, Diagnostic)]
pub enum GeneratorError {
    #[error("generator transport error")]
    #[diagnostic(code(terramend::ports::generator_transport))]
    Transport(#[from] reqwest::Error),

    #[error("generator endpoint returned {status}: {detail}")]
    #[diagnostic(
        code(terramend::ports::generator_api),
        help("Check the endpoint URL, API key, and model name in the settings.")
    )]
    Api { status: u16, detail: String },

    #[error("generator returned no completion choices")]
    #[diagnostic(code(terramend::ports::generator_empty))]
    EmptyCompletion,
}

/// Validator collaborator failure at the I/O level.
///
/// An artifact failing a check is a [`CheckReport`], never an error.
#[derive(Debug, Error, Diagnostic)]
pub enum ValidatorError {
    #[error("validation sink I/O error")]
    #[diagnostic(
        code(terramend::ports::validator_io),
        help("Check that the validator workdir exists and is writable.")
    )]
    Io(#[from] std::io::Error),
}

/// Discovery collaborator failure. Always recovered by the discovery stage.
#[derive(Debug, Error, Diagnostic)]
pub enum DiscoveryError {
    #[error("discovery transport error")]
    #[diagnostic(code(terramend::ports::discovery_transport))]
    Transport(#[from] reqwest::Error),

    #[error("fetch of {url} timed out")]
    #[diagnostic(code(terramend::ports::discovery_timeout))]
    Timeout { url: String },

    #[error("discovery backend unavailable: {detail}")]
    #[diagnostic(code(terramend::ports::discovery_unavailable))]
    Unavailable { detail: String },
}
