//! Web documentation discovery over DuckDuckGo's HTML endpoint.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use super::{DiscoveryError, DiscoveryPort, SearchHit};

/// Per-fetch deadline. This is the only timeout the workflow applies to any
/// external call.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_SEARCH_BASE: &str = "https://html.duckduckgo.com/html/";
const RESULT_LINK_SELECTOR: &str = "a.result__a";

/// [`DiscoveryPort`] backed by DuckDuckGo's HTML search plus plain HTTP
/// fetches of the result pages.
///
/// Result links are resolved through DuckDuckGo's redirect wrapper
/// (`uddg` query parameter) when present, then filtered to the requested
/// documentation domain. Fetched pages are reduced to their visible text.
#[derive(Clone, Debug)]
pub struct WebDiscovery {
    client: reqwest::Client,
    search_base: String,
}

impl WebDiscovery {
    pub fn new() -> Self {
        Self::with_search_base(DEFAULT_SEARCH_BASE)
    }

    /// Points the search at an alternate base URL (tests, proxies).
    pub fn with_search_base(search_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            search_base: search_base.into(),
        }
    }
}

impl Default for WebDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

/// Unwraps DuckDuckGo's redirect links; other links pass through untouched.
fn resolve_result_url(href: &str) -> String {
    if let Ok(parsed) = Url::parse(href) {
        if let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "uddg") {
            return target.into_owned();
        }
    }
    href.to_string()
}

fn extract_hits(body: &str, domain_filter: &str, max_results: usize) -> Vec<SearchHit> {
    let Ok(selector) = Selector::parse(RESULT_LINK_SELECTOR) else {
        return Vec::new();
    };
    let document = Html::parse_document(body);
    let mut hits = Vec::new();
    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let url = resolve_result_url(href);
        if !url.contains(domain_filter) {
            continue;
        }
        let title = anchor.text().collect::<String>().trim().to_string();
        hits.push(SearchHit { url, title });
        if hits.len() >= max_results {
            break;
        }
    }
    hits
}

fn html_to_text(body: &str) -> String {
    let document = Html::parse_document(body);
    let text = document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    text
}

#[async_trait]
impl DiscoveryPort for WebDiscovery {
    async fn search(
        &self,
        query: &str,
        domain_filter: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, DiscoveryError> {
        let response = self
            .client
            .get(&self.search_base)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Unavailable {
                detail: format!("search returned {status}"),
            });
        }
        let body = response.text().await?;
        Ok(extract_hits(&body, domain_filter, max_results))
    }

    async fn fetch(&self, url: &str) -> Result<String, DiscoveryError> {
        let request = self.client.get(url).send();
        let response = tokio::time::timeout(FETCH_TIMEOUT, request)
            .await
            .map_err(|_| DiscoveryError::Timeout {
                url: url.to_string(),
            })??;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Unavailable {
                detail: format!("{url} returned {status}"),
            });
        }
        let body = tokio::time::timeout(FETCH_TIMEOUT, response.text())
            .await
            .map_err(|_| DiscoveryError::Timeout {
                url: url.to_string(),
            })??;
        Ok(html_to_text(&body))
    }
}
