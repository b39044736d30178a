//! The five stages of the remediation workflow.
//!
//! Each stage is a [`Stage`](crate::stage::Stage) implementation holding its
//! injected ports. The happy path is
//! discovery → intelligence → architect → validate; triage is entered only
//! after a failed validation and can cycle control back to discovery,
//! intelligence, or architect.

mod architect;
mod discovery;
mod intelligence;
mod triage;
mod validate;

pub use architect::ArchitectStage;
pub use discovery::{DiscoveryStage, EXCERPT_CHAR_LIMIT, MAX_DOCUMENTS, SNIPPET_CHAR_LIMIT};
pub use intelligence::IntelligenceStage;
pub use triage::{TriageReport, TriageStage};
pub use validate::ValidateStage;
