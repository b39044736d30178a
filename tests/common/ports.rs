//! Scripted test doubles for the collaborator ports.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use terramend::ports::{
    CheckReport, DiscoveryError, DiscoveryPort, GeneratorError, GeneratorPort, Role, SearchHit,
    ValidatorError, ValidatorPort,
};

/// Generator double with per-role response queues and call recording.
///
/// A role with an exhausted (or absent) queue answers with a canned
/// `"<role> output"` line, so multi-attempt runs keep flowing without
/// scripting every call.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<HashMap<Role, VecDeque<String>>>,
    failing: Mutex<HashSet<Role>>,
    calls: Mutex<Vec<(Role, String)>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one response for `role`.
    pub fn respond(self, role: Role, text: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(role)
            .or_default()
            .push_back(text.into());
        self
    }

    /// Makes every call for `role` fail.
    pub fn fail_role(self, role: Role) -> Self {
        self.failing.lock().unwrap().insert(role);
        self
    }

    /// Contexts recorded for `role`, in call order.
    pub fn calls_for(&self, role: Role) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, context)| context.clone())
            .collect()
    }

    pub fn call_count(&self, role: Role) -> usize {
        self.calls_for(role).len()
    }
}

#[async_trait]
impl GeneratorPort for ScriptedGenerator {
    async fn generate(&self, role: Role, context: &str) -> Result<String, GeneratorError> {
        self.calls
            .lock()
            .unwrap()
            .push((role, context.to_string()));
        if self.failing.lock().unwrap().contains(&role) {
            return Err(GeneratorError::Api {
                status: 503,
                detail: "scripted failure".to_string(),
            });
        }
        let scripted = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&role)
            .and_then(VecDeque::pop_front);
        Ok(scripted.unwrap_or_else(|| format!("{role} output")))
    }
}

/// Validator double with scripted check outcomes and call counters.
///
/// Exhausted queues default to a clean pass.
#[derive(Default)]
pub struct ScriptedValidator {
    structure: Mutex<VecDeque<CheckReport>>,
    policy: Mutex<VecDeque<CheckReport>>,
    persisted: Mutex<Vec<String>>,
    structure_calls: AtomicUsize,
    policy_calls: AtomicUsize,
}

impl ScriptedValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure_fail(self, diagnostic: impl Into<String>) -> Self {
        self.structure
            .lock()
            .unwrap()
            .push_back(CheckReport::fail(diagnostic));
        self
    }

    pub fn structure_pass(self) -> Self {
        self.structure.lock().unwrap().push_back(CheckReport::pass());
        self
    }

    pub fn policy_fail(self, diagnostic: impl Into<String>) -> Self {
        self.policy
            .lock()
            .unwrap()
            .push_back(CheckReport::fail(diagnostic));
        self
    }

    pub fn policy_skip(self) -> Self {
        self.policy
            .lock()
            .unwrap()
            .push_back(CheckReport::skipped("checkov"));
        self
    }

    pub fn persisted(&self) -> Vec<String> {
        self.persisted.lock().unwrap().clone()
    }

    pub fn structure_call_count(&self) -> usize {
        self.structure_calls.load(Ordering::SeqCst)
    }

    pub fn policy_call_count(&self) -> usize {
        self.policy_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ValidatorPort for ScriptedValidator {
    async fn persist(&self, artifact: &str) -> Result<(), ValidatorError> {
        self.persisted.lock().unwrap().push(artifact.to_string());
        Ok(())
    }

    async fn check_structure(&self, _artifact: &str) -> Result<CheckReport, ValidatorError> {
        self.structure_calls.fetch_add(1, Ordering::SeqCst);
        let report = self.structure.lock().unwrap().pop_front();
        Ok(report.unwrap_or_else(CheckReport::pass))
    }

    async fn check_policy(&self, _artifact: &str) -> Result<CheckReport, ValidatorError> {
        self.policy_calls.fetch_add(1, Ordering::SeqCst);
        let report = self.policy.lock().unwrap().pop_front();
        Ok(report.unwrap_or_else(CheckReport::pass))
    }
}

/// Discovery double serving fixed hits and bodies.
#[derive(Default)]
pub struct StubDiscovery {
    hits: Vec<SearchHit>,
    bodies: HashMap<String, String>,
    fail_search: bool,
}

impl StubDiscovery {
    /// A backend with nothing to offer: searches succeed but return no hits.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A backend that is entirely unavailable.
    pub fn unavailable() -> Self {
        Self {
            fail_search: true,
            ..Self::default()
        }
    }

    /// Adds a hit; `body` of `None` makes the fetch fail.
    pub fn with_hit(mut self, url: &str, title: &str, body: Option<&str>) -> Self {
        self.hits.push(SearchHit {
            url: url.to_string(),
            title: title.to_string(),
        });
        if let Some(body) = body {
            self.bodies.insert(url.to_string(), body.to_string());
        }
        self
    }
}

#[async_trait]
impl DiscoveryPort for StubDiscovery {
    async fn search(
        &self,
        _query: &str,
        _domain_filter: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, DiscoveryError> {
        if self.fail_search {
            return Err(DiscoveryError::Unavailable {
                detail: "scripted outage".to_string(),
            });
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }

    async fn fetch(&self, url: &str) -> Result<String, DiscoveryError> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| DiscoveryError::Unavailable {
                detail: format!("no body for {url}"),
            })
    }
}
