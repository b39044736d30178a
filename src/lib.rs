//! # Terramend: graph-driven infrastructure-as-code remediation
//!
//! Terramend turns a natural-language infrastructure request into validated,
//! security-compliant infrastructure-as-code by driving a directed graph of
//! specialized stages: documentation discovery, concurrent research/security
//! intelligence, artifact synthesis, external validation, and a triage stage
//! that classifies failures and decides whether to retry, re-research, or
//! abort.
//!
//! ## Core concepts
//!
//! - **Stages**: async units of work consuming a state snapshot and
//!   returning a partial update ([`stage::Stage`], [`state::StageDelta`])
//! - **State**: one typed record per run, merged delta-by-delta
//!   ([`state::WorkflowState`])
//! - **Graph**: closed stage enumeration, fixed edges, and state-driven
//!   routers compiled into an engine ([`graphs::WorkflowBuilder`],
//!   [`app::Workflow`])
//! - **Ports**: injected external collaborators for generation, validation,
//!   and documentation search ([`ports`])
//! - **Routing policy**: success / retry-budget / triage escalation
//!   ([`routing`])
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use terramend::config::Settings;
//! use terramend::state::RunStatus;
//! use terramend::workflow::RemediationWorkflow;
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     terramend::telemetry::init();
//!
//!     let settings = Settings::from_env()?;
//!     let workflow = RemediationWorkflow::from_settings(&settings)?;
//!     let outcome = workflow
//!         .run("Create an AWS S3 bucket named 'demo' with versioning")
//!         .await?;
//!
//!     match outcome.status {
//!         RunStatus::Success => println!("{}", outcome.code),
//!         _ => eprintln!("run ended as {:?}: {}", outcome.status, outcome.error),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module guide
//!
//! - [`types`] - Closed stage/terminal/route identifiers
//! - [`state`] - Workflow state record and delta merging
//! - [`stage`] - Stage trait and execution context
//! - [`ports`] - Collaborator traits and production implementations
//! - [`stages`] - The five remediation stages
//! - [`graphs`] - Graph building and compilation
//! - [`app`] - The execution engine
//! - [`routing`] - Routers and the retry budget
//! - [`workflow`] - The assembled workflow and run entry point
//! - [`structured`] - Parse-or-degrade handling of structured generator output
//! - [`config`] / [`telemetry`] - Environment settings and tracing setup

pub mod app;
pub mod config;
pub mod graphs;
pub mod ports;
pub mod routing;
pub mod stage;
pub mod stages;
pub mod state;
pub mod structured;
pub mod telemetry;
pub mod types;
pub mod utils;
pub mod workflow;
