//! Per-stage behavior driven through scripted port doubles.

mod common;

use std::sync::Arc;

use common::{ScriptedGenerator, ScriptedValidator, StubDiscovery, ctx};
use terramend::ports::Role;
use terramend::stage::Stage;
use terramend::stages::{
    ArchitectStage, DiscoveryStage, IntelligenceStage, TriageStage, ValidateStage,
};
use terramend::state::{RemediationTarget, RunStatus, WorkflowState};
use terramend::types::StageKind;

fn apply(delta: terramend::state::StageDelta, state: &mut WorkflowState) {
    delta.apply(state);
}

// --- intelligence ---

#[tokio::test]
async fn intelligence_fans_out_and_merges_both_fields() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .respond(Role::Researcher, "syntax notes")
            .respond(Role::Security, "security notes"),
    );
    let stage = IntelligenceStage::new(generator.clone());

    let mut state = WorkflowState::new("make a bucket");
    let delta = stage
        .run(state.clone(), ctx(StageKind::Intelligence))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.syntax_guide, "syntax notes");
    assert_eq!(state.security_policy, "security notes");
    assert_eq!(generator.call_count(Role::Researcher), 1);
    assert_eq!(generator.call_count(Role::Security), 1);
}

#[tokio::test]
async fn intelligence_sub_stages_see_the_identical_context() {
    let generator = Arc::new(ScriptedGenerator::new());
    let stage = IntelligenceStage::new(generator.clone());

    let mut state = WorkflowState::new("make a bucket");
    state.documentation_snippets = "doc summary".into();
    stage
        .run(state, ctx(StageKind::Intelligence))
        .await
        .unwrap();

    let research = generator.calls_for(Role::Researcher);
    let security = generator.calls_for(Role::Security);
    assert_eq!(research, security);
    assert!(research[0].contains("User wants: make a bucket"));
    assert!(research[0].contains("doc summary"));
}

#[tokio::test]
async fn follow_up_prompt_feeds_exactly_one_intelligence_run() {
    let generator = Arc::new(ScriptedGenerator::new());
    let stage = IntelligenceStage::new(generator.clone());

    let mut state = WorkflowState::new("make a bucket");
    state.follow_up_prompt = "ask about KMS keys".into();

    let delta = stage
        .run(state.clone(), ctx(StageKind::Intelligence))
        .await
        .unwrap();
    apply(delta, &mut state);
    assert_eq!(state.follow_up_prompt, "");

    let delta = stage
        .run(state.clone(), ctx(StageKind::Intelligence))
        .await
        .unwrap();
    apply(delta, &mut state);

    let calls = generator.calls_for(Role::Researcher);
    assert!(calls[0].contains("ask about KMS keys"));
    assert!(!calls[1].contains("ask about KMS keys"));
}

#[tokio::test]
async fn intelligence_propagates_sub_stage_failure() {
    let generator = Arc::new(ScriptedGenerator::new().fail_role(Role::Security));
    let stage = IntelligenceStage::new(generator);

    let result = stage
        .run(WorkflowState::new("req"), ctx(StageKind::Intelligence))
        .await;
    assert!(result.is_err());
}

// --- architect ---

#[tokio::test]
async fn architect_increments_retry_and_strips_fences() {
    let generator = Arc::new(ScriptedGenerator::new().respond(
        Role::Architect,
        "```hcl\nresource \"aws_s3_bucket\" \"b\" {}\n```",
    ));
    let stage = ArchitectStage::new(generator);

    let mut state = WorkflowState::new("make a bucket");
    state.retry_count = 2;
    let delta = stage
        .run(state.clone(), ctx(StageKind::Architect))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.code, "resource \"aws_s3_bucket\" \"b\" {}");
    assert_eq!(state.retry_count, 3);
}

#[tokio::test]
async fn architect_prompt_carries_error_and_triage_guidance() {
    let generator = Arc::new(ScriptedGenerator::new());
    let stage = ArchitectStage::new(generator.clone());

    let mut state = WorkflowState::new("make a bucket");
    state.syntax_guide = "the guide".into();
    state.security_policy = "the policy".into();
    state.error = "Syntax Error:\nmissing brace".into();
    state.diagnosis = Some("unbalanced block".into());
    state.fix_instructions = Some("close the brace".into());

    stage.run(state, ctx(StageKind::Architect)).await.unwrap();

    let prompt = &generator.calls_for(Role::Architect)[0];
    assert!(prompt.contains("the guide"));
    assert!(prompt.contains("the policy"));
    assert!(prompt.contains("missing brace"));
    assert!(prompt.contains("unbalanced block"));
    assert!(prompt.contains("close the brace"));
}

// --- validate ---

#[tokio::test]
async fn validate_rejects_an_empty_artifact_without_touching_the_sink() {
    let validator = Arc::new(ScriptedValidator::new());
    let stage = ValidateStage::new(validator.clone());

    let mut state = WorkflowState::new("req");
    let delta = stage
        .run(state.clone(), ctx(StageKind::Validate))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.status, RunStatus::Failed);
    assert!(state.has_error());
    assert!(validator.persisted().is_empty());
    assert_eq!(validator.structure_call_count(), 0);
}

#[tokio::test]
async fn validate_short_circuits_on_structural_failure() {
    let validator = Arc::new(ScriptedValidator::new().structure_fail("Syntax Error:\nbad block"));
    let stage = ValidateStage::new(validator.clone());

    let mut state = WorkflowState::new("req");
    state.code = "resource {}".into();
    let delta = stage
        .run(state.clone(), ctx(StageKind::Validate))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.error, "Syntax Error:\nbad block");
    // Policy never runs after a structural failure.
    assert_eq!(validator.policy_call_count(), 0);
    assert_eq!(validator.persisted(), vec!["resource {}".to_string()]);
}

#[tokio::test]
async fn validate_reports_policy_failure_after_a_structural_pass() {
    let validator = Arc::new(
        ScriptedValidator::new()
            .structure_pass()
            .policy_fail("Security Violations:\npublic bucket"),
    );
    let stage = ValidateStage::new(validator);

    let mut state = WorkflowState::new("req");
    state.code = "resource \"aws_s3_bucket\" \"b\" {}".into();
    let delta = stage
        .run(state.clone(), ctx(StageKind::Validate))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.error, "Security Violations:\npublic bucket");
}

#[tokio::test]
async fn validate_success_clears_a_standing_error() {
    let validator = Arc::new(ScriptedValidator::new());
    let stage = ValidateStage::new(validator);

    let mut state = WorkflowState::new("req");
    state.code = "resource \"aws_s3_bucket\" \"b\" {}".into();
    state.error = "Syntax Error:\nold diagnostic".into();
    state.retry_count = 2;
    let delta = stage
        .run(state.clone(), ctx(StageKind::Validate))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.status, RunStatus::Success);
    assert!(!state.has_error());
    // The retry counter belongs to the architect.
    assert_eq!(state.retry_count, 2);
}

#[tokio::test]
async fn validate_is_idempotent_for_an_unchanged_artifact() {
    let validator = Arc::new(ScriptedValidator::new());
    let stage = ValidateStage::new(validator);

    let mut state = WorkflowState::new("req");
    state.code = "resource \"aws_s3_bucket\" \"b\" {}".into();

    let first = stage
        .run(state.clone(), ctx(StageKind::Validate))
        .await
        .unwrap();
    let mut after_first = state.clone();
    apply(first, &mut after_first);

    let second = stage
        .run(after_first.clone(), ctx(StageKind::Validate))
        .await
        .unwrap();
    let mut after_second = after_first.clone();
    apply(second, &mut after_second);

    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn validate_treats_a_skipped_policy_check_as_a_pass() {
    let validator = Arc::new(ScriptedValidator::new().policy_skip());
    let stage = ValidateStage::new(validator);

    let mut state = WorkflowState::new("req");
    state.code = "resource \"aws_s3_bucket\" \"b\" {}".into();
    let delta = stage
        .run(state.clone(), ctx(StageKind::Validate))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.status, RunStatus::Success);
}

// --- triage ---

#[tokio::test]
async fn triage_abort_verdict_sets_abort_target() {
    let generator = Arc::new(ScriptedGenerator::new().respond(
        Role::Triage,
        r#"{"summary": "provider cannot do this", "should_abort": true}"#,
    ));
    let stage = TriageStage::new(generator);

    let mut state = WorkflowState::new("req");
    state.error = "Syntax Error:\nno such resource".into();
    let delta = stage
        .run(state.clone(), ctx(StageKind::Triage))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.next_node, Some(RemediationTarget::Abort));
    assert_eq!(state.status, RunStatus::Aborted);
    assert_eq!(state.diagnosis.as_deref(), Some("provider cannot do this"));
}

#[tokio::test]
async fn triage_research_verdict_routes_to_discovery_with_follow_up() {
    let generator = Arc::new(ScriptedGenerator::new().respond(
        Role::Triage,
        r#"{"summary": "unknown argument", "needs_additional_research": true, "follow_up_prompt": "check provider v5 docs"}"#,
    ));
    let stage = TriageStage::new(generator);

    let mut state = WorkflowState::new("req");
    state.error = "Syntax Error:\nunknown argument".into();
    let delta = stage
        .run(state.clone(), ctx(StageKind::Triage))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.next_node, Some(RemediationTarget::Discovery));
    assert_eq!(state.status, RunStatus::Retry);
    assert_eq!(state.follow_up_prompt, "check provider v5 docs");
}

#[tokio::test]
async fn triage_degrades_unparseable_output_into_a_retry() {
    let generator = Arc::new(
        ScriptedGenerator::new().respond(Role::Triage, "Honestly, just add the encryption block."),
    );
    let stage = TriageStage::new(generator);

    let mut state = WorkflowState::new("req");
    state.error = "Security Violations:\nno encryption".into();
    let delta = stage
        .run(state.clone(), ctx(StageKind::Triage))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.next_node, Some(RemediationTarget::Architect));
    assert_eq!(state.status, RunStatus::Retry);
    assert_eq!(
        state.fix_instructions.as_deref(),
        Some("Honestly, just add the encryption block.")
    );
}

#[tokio::test]
async fn triage_payload_substitutes_unknown_failure_for_an_empty_error() {
    let generator = Arc::new(ScriptedGenerator::new());
    let stage = TriageStage::new(generator.clone());

    let state = WorkflowState::new("req");
    stage.run(state, ctx(StageKind::Triage)).await.unwrap();

    let payload = &generator.calls_for(Role::Triage)[0];
    assert!(payload.contains("Unknown failure"));
}

// --- discovery ---

#[tokio::test]
async fn discovery_collects_and_summarizes_documents() {
    let backend = Arc::new(
        StubDiscovery::empty()
            .with_hit("https://docs.example/a", "A", Some("body a"))
            .with_hit("https://docs.example/a", "A again", None)
            .with_hit("https://docs.example/b", "B", Some("body b")),
    );
    let generator = Arc::new(ScriptedGenerator::new().respond(Role::Discovery, "doc summary"));
    let stage = DiscoveryStage::new(generator.clone(), backend, "docs.example");

    let mut state = WorkflowState::new("make a bucket");
    let delta = stage
        .run(state.clone(), ctx(StageKind::Discovery))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(
        state.documentation_urls,
        vec![
            "https://docs.example/a".to_string(),
            "https://docs.example/b".to_string()
        ]
    );
    assert_eq!(state.documentation_snippets, "doc summary");
    let excerpt_input = &generator.calls_for(Role::Discovery)[0];
    assert!(excerpt_input.contains("body a"));
    assert!(excerpt_input.contains("body b"));
}

#[tokio::test]
async fn discovery_falls_back_to_raw_excerpts_when_summarization_fails() {
    let backend =
        Arc::new(StubDiscovery::empty().with_hit("https://docs.example/a", "A", Some("body a")));
    let generator = Arc::new(ScriptedGenerator::new().fail_role(Role::Discovery));
    let stage = DiscoveryStage::new(generator, backend, "docs.example");

    let mut state = WorkflowState::new("req");
    let delta = stage
        .run(state.clone(), ctx(StageKind::Discovery))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert!(state.documentation_snippets.contains("body a"));
}

#[tokio::test]
async fn discovery_keeps_urls_when_every_fetch_fails() {
    let backend = Arc::new(StubDiscovery::empty().with_hit("https://docs.example/a", "A", None));
    let generator = Arc::new(ScriptedGenerator::new());
    let stage = DiscoveryStage::new(generator.clone(), backend, "docs.example");

    let mut state = WorkflowState::new("req");
    let delta = stage
        .run(state.clone(), ctx(StageKind::Discovery))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert_eq!(state.documentation_urls, vec!["https://docs.example/a"]);
    assert_eq!(state.documentation_snippets, "https://docs.example/a");
    // No excerpts means no summarization call.
    assert_eq!(generator.call_count(Role::Discovery), 0);
}

#[tokio::test]
async fn discovery_survives_a_search_outage_with_empty_results() {
    let backend = Arc::new(StubDiscovery::unavailable());
    let generator = Arc::new(ScriptedGenerator::new());
    let stage = DiscoveryStage::new(generator, backend, "docs.example");

    let mut state = WorkflowState::new("req");
    let delta = stage
        .run(state.clone(), ctx(StageKind::Discovery))
        .await
        .unwrap();
    apply(delta, &mut state);

    assert!(state.documentation_urls.is_empty());
    assert_eq!(state.documentation_snippets, "");
}
