//! Research agent HTTP client tests against a mock upstream

use airdrop_research_service::agent_client::{HttpResearchAgent, ResearchAgent};
use airdrop_research_service::cache::ResearchCache;
use airdrop_research_service::error::AgentError;
use airdrop_research_service::orchestrator::{OrchestratorSettings, ResearchOrchestrator};
use airdrop_research_service::random::RandomSource;
use airdrop_research_service::types::{AgentResearchRequest, ResearchRequest};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn research_request() -> AgentResearchRequest {
    AgentResearchRequest {
        goal: "Check airdrop eligibility for wallet 0xabc on Scroll.".to_string(),
        profile: "crypto_analytics_agent".to_string(),
        max_steps: 15,
        save_state: false,
    }
}

fn orchestrator(base_url: &str) -> ResearchOrchestrator {
    let agent = HttpResearchAgent::new(base_url, Duration::from_secs(5)).unwrap();
    ResearchOrchestrator::new(
        Arc::new(agent),
        Arc::new(ResearchCache::new(100)),
        Arc::new(RandomSource::seeded(1)),
        OrchestratorSettings::default(),
    )
}

#[tokio::test]
async fn test_research_posts_expected_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/research")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "profile": "crypto_analytics_agent",
            "max_steps": 15,
            "save_state": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result": "eligible", "execution_id": "exec_9"}"#)
        .create_async()
        .await;

    let agent = HttpResearchAgent::new(&server.url(), Duration::from_secs(5)).unwrap();
    let response = agent.research(&research_request()).await.unwrap();

    assert_eq!(response.result, "eligible");
    assert_eq!(response.execution_id.as_deref(), Some("exec_9"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_research_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/research")
        .with_status(502)
        .create_async()
        .await;

    let agent = HttpResearchAgent::new(&server.url(), Duration::from_secs(5)).unwrap();
    let err = agent.research(&research_request()).await.unwrap_err();
    assert!(matches!(err, AgentError::Status(status) if status.as_u16() == 502));
}

#[tokio::test]
async fn test_research_malformed_envelope() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/research")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let agent = HttpResearchAgent::new(&server.url(), Duration::from_secs(5)).unwrap();
    let err = agent.research(&research_request()).await.unwrap_err();
    assert!(matches!(err, AgentError::MalformedPayload(_)));
}

#[tokio::test]
async fn test_health_checks_upstream() {
    let mut server = mockito::Server::new_async().await;
    let healthy = server.mock("GET", "/health").with_status(200).create_async().await;

    let agent = HttpResearchAgent::new(&format!("{}/", server.url()), Duration::from_secs(5)).unwrap();
    assert!(agent.health().await.is_ok());
    healthy.assert_async().await;
}

#[tokio::test]
async fn test_cached_research_hits_upstream_once() {
    let mut server = mockito::Server::new_async().await;
    let reply = json!({
        "result": "Summary follows {\"found_airdrops\": [{\"protocol\": \"Base\", \"eligible\": true, \"estimated_value\": 650, \"deadline\": \"2025-05-01\", \"requirements\": [\"Bridge activity\"]}], \"research_summary\": \"Base looks good\"}",
        "execution_id": "exec_77"
    });
    let mock = server
        .mock("POST", "/research")
        .match_body(Matcher::PartialJson(json!({"max_steps": 25})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply.to_string())
        .expect(1)
        .create_async()
        .await;

    let orchestrator = orchestrator(&server.url());
    let request = ResearchRequest::new("0xabc", 30);

    let first = orchestrator.research(&request).await;
    let second = orchestrator.research(&request).await;

    assert_eq!(first, second);
    assert_eq!(first.total_estimated_value, 650.0);
    assert_eq!(first.execution_id, "exec_77");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_upstream_falls_back_to_demo() {
    // Nothing listens on the discard port.
    let orchestrator = orchestrator("http://127.0.0.1:9");

    let result = orchestrator.research(&ResearchRequest::new("0xabc", 30)).await;
    assert_eq!(result.found_airdrops.len(), 3);
    assert_eq!(result.total_estimated_value, 2000.0);
    assert_eq!(orchestrator.cache_size().await, 0);
    assert!(!orchestrator.agent_reachable().await);
}
