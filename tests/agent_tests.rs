//! End-to-end agent runs through the setup service with fake collaborators

mod test_utils;

use insight_agents::agents::backend::BackendReply;
use insight_agents::agents::specialized::{SynthesisInput, ToolInput, TrendInput};
use insight_agents::agents::{AgentSetupService, FailureKind};
use insight_agents::config::Config;
use insight_agents::mcp::supervisor::LaunchDescriptor;

use serde_json::json;
use std::sync::Arc;
use test_utils::{FakeConnector, FakeMode, ScriptedBackend, tool_call};
use tokio_util::sync::CancellationToken;

fn config_with_providers(names: &[&str]) -> Config {
    let mut config = Config::default();
    for name in names {
        config
            .tool_providers
            .insert((*name).to_string(), LaunchDescriptor::new("fake-provider"));
    }
    config
}

fn synthesis_input() -> ToolInput {
    ToolInput::Synthesis(SynthesisInput {
        domains: vec!["AI".to_string(), "ethics".to_string()],
        research_question: "How should models be audited?".to_string(),
        depth: "comprehensive".to_string(),
    })
}

fn synthesis_answer() -> String {
    json!({
        "synthesis_summary": "Audits need both technical and social lenses.",
        "domain_connections": ["Fairness metrics borrow from legal doctrine"],
        "cross_domain_insights": ["Red-teaming mirrors adversarial review"],
        "convergence_patterns": [],
        "interdisciplinary_opportunities": ["Joint audit curricula"],
        "knowledge_gaps": ["Long-term harm measurement"],
        "synthesis_methodology": "Literature triangulation",
        "confidence_scores": {"fairness": 0.8333, "accountability": 0.5},
        "supporting_evidence": [],
        "citations": ["Raji et al. 2020"]
    })
    .to_string()
}

#[tokio::test]
async fn test_synthesis_report_end_to_end() {
    let backend = ScriptedBackend::new([
        Ok(BackendReply::ToolCalls(vec![tool_call(
            "c1",
            "semantic_scholar",
            json!({"query": "model audits"}),
        )])),
        Ok(BackendReply::Answer(synthesis_answer())),
    ]);
    let connector = FakeConnector::new(FakeMode::Healthy);
    let service = AgentSetupService::new(config_with_providers(&[
        "semantic_scholar",
        "fetch",
        "web_crawler",
        "notion",
    ]))
    .with_backend(Arc::clone(&backend) as _)
    .with_connector(Arc::clone(&connector) as _);

    let report = service.run_tool(&synthesis_input()).await;

    assert!(
        report.starts_with(
            "# Cross-Domain Knowledge Synthesis\n\n\
             ## Research Question\nHow should models be audited?\n\n\
             ## Domains Analyzed\nAI, ethics\n\n\
             ## Synthesis Summary\nAudits need both technical and social lenses.\n"
        ),
        "{report}"
    );
    assert!(report.contains("\n## Convergence Patterns\n\n## Interdisciplinary Opportunities\n"));
    assert!(report.contains("\n## Methodology\nLiterature triangulation\n"));
    assert!(report.contains("\n## Confidence Scores\n- fairness: 0.83\n- accountability: 0.50\n"));
    assert!(report.ends_with("*Generated by Knowledge Synthesizer*\n"));

    assert_eq!(backend.calls(), 2);
    assert_eq!(connector.starts(), 4);
    assert_eq!(connector.stops(), 4);
}

#[tokio::test]
async fn test_unconfigured_providers_are_skipped() {
    let backend = ScriptedBackend::answers(&[synthesis_answer().as_str()]);
    let connector = FakeConnector::new(FakeMode::Healthy);
    let service = AgentSetupService::new(config_with_providers(&["fetch"]))
        .with_backend(Arc::clone(&backend) as _)
        .with_connector(Arc::clone(&connector) as _);

    let result = service.execute(&synthesis_input()).await;

    assert!(result.is_ok());
    assert_eq!(connector.starts(), 1);
    assert_eq!(connector.stops(), 1);
}

#[tokio::test]
async fn test_missing_api_key_renders_inline_failure() {
    let mut config = Config::default();
    config.apply_env(|_| None);
    let service = AgentSetupService::new(config);

    let report = service.run_tool(&synthesis_input()).await;

    assert!(report.starts_with("Knowledge synthesis failed: "), "{report}");
    assert!(report.contains("GOOGLE_API_KEY"), "{report}");
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let backend = ScriptedBackend::answers(&[]);
    let connector = FakeConnector::new(FakeMode::HangingCalls);
    let service = AgentSetupService::new(config_with_providers(&["fetch"]))
        .with_backend(Arc::clone(&backend) as _)
        .with_connector(Arc::clone(&connector) as _);

    let token = CancellationToken::new();
    token.cancel();
    let input = ToolInput::Trends(TrendInput {
        domain: "robotics".to_string(),
        timeframe: "short-term".to_string(),
        sources: vec!["patents".to_string()],
    });
    let failure = service
        .execute_with_cancellation(&input, token)
        .await
        .expect_err("cancelled");

    assert_eq!(failure.kind(), FailureKind::Cancelled);
    assert_eq!(backend.calls(), 0);
    assert_eq!(connector.starts(), connector.stops());
}
