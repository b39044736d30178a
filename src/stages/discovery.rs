//! Discovery stage: best-effort documentation gathering.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::{DiscoveryPort, GeneratorPort, Role};
use crate::stage::{Stage, StageContext, StageError};
use crate::state::{StageDelta, WorkflowState};
use crate::utils::truncate_chars;

/// Unique documents to collect before stopping.
pub const MAX_DOCUMENTS: usize = 3;
/// Per-document excerpt bound, in characters.
pub const EXCERPT_CHAR_LIMIT: usize = 2_500;
/// Bound on the combined excerpt text handed to the summarizer.
pub const SNIPPET_CHAR_LIMIT: usize = 3_500;

/// Search results requested from the backend; more than [`MAX_DOCUMENTS`]
/// so off-domain and unfetchable candidates can be discarded.
const SEARCH_CANDIDATES: usize = 8;

/// Gathers up to [`MAX_DOCUMENTS`] reference documents for the request and
/// summarizes them for the intelligence sub-stages.
///
/// Everything here is best-effort enrichment: a failed search yields empty
/// results, a failed fetch is skipped, and a failed summarization falls
/// back to the raw excerpts. Discovery never fails the run.
pub struct DiscoveryStage {
    generator: Arc<dyn GeneratorPort>,
    discovery: Arc<dyn DiscoveryPort>,
    domain: String,
}

impl DiscoveryStage {
    /// `domain` scopes the search to one authoritative documentation site.
    pub fn new(
        generator: Arc<dyn GeneratorPort>,
        discovery: Arc<dyn DiscoveryPort>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            discovery,
            domain: domain.into(),
        }
    }
}

#[async_trait]
impl Stage for DiscoveryStage {
    async fn run(
        &self,
        snapshot: WorkflowState,
        ctx: StageContext,
    ) -> Result<StageDelta, StageError> {
        ctx.note("searching authoritative documentation");
        let query = format!("site:{} {}", self.domain, snapshot.request);

        let hits = match self
            .discovery
            .search(&query, &self.domain, SEARCH_CANDIDATES)
            .await
        {
            Ok(hits) => hits,
            Err(err) => {
                tracing::warn!(error = %err, "documentation search unavailable");
                Vec::new()
            }
        };

        let mut urls: Vec<String> = Vec::new();
        let mut excerpts: Vec<String> = Vec::new();
        for hit in hits {
            if urls.contains(&hit.url) {
                continue;
            }
            urls.push(hit.url.clone());
            match self.discovery.fetch(&hit.url).await {
                Ok(body) => excerpts.push(format!(
                    "URL: {}\n{}",
                    hit.url,
                    truncate_chars(&body, EXCERPT_CHAR_LIMIT)
                )),
                Err(err) => {
                    tracing::debug!(url = %hit.url, error = %err, "fetch skipped");
                }
            }
            if urls.len() >= MAX_DOCUMENTS {
                break;
            }
        }

        let snippets = if !excerpts.is_empty() {
            let combined = truncate_chars(&excerpts.join("\n\n"), SNIPPET_CHAR_LIMIT).into_owned();
            match self.generator.generate(Role::Discovery, &combined).await {
                Ok(summary) => summary.trim().to_string(),
                Err(err) => {
                    tracing::warn!(error = %err, "summarization failed; using raw excerpts");
                    combined
                }
            }
        } else if !urls.is_empty() {
            urls.join("\n")
        } else {
            String::new()
        };

        Ok(StageDelta::new()
            .with_documentation_urls(urls)
            .with_documentation_snippets(snippets))
    }
}
