use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::AgentError;
use crate::types::{AgentResearchRequest, AgentResearchResponse};

/// The external research agent, seen as an opaque collaborator.
#[async_trait]
pub trait ResearchAgent: Send + Sync {
    async fn research(&self, request: &AgentResearchRequest) -> Result<AgentResearchResponse, AgentError>;

    async fn health(&self) -> Result<(), AgentError>;
}

pub struct HttpResearchAgent {
    client: Client,
    base_url: String,
}

impl HttpResearchAgent {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, AgentError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ResearchAgent for HttpResearchAgent {
    async fn research(&self, request: &AgentResearchRequest) -> Result<AgentResearchResponse, AgentError> {
        let url = self.url("/research");
        tracing::info!("Calling research agent at {} (max_steps={})", url, request.max_steps);

        let response = self.client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::Status(response.status()));
        }

        let body = response.text().await?;
        let payload: AgentResearchResponse = serde_json::from_str(&body)
            .map_err(|e| AgentError::MalformedPayload(format!("research envelope: {}", e)))?;

        tracing::info!("Research agent completed (execution_id={:?})", payload.execution_id);
        Ok(payload)
    }

    async fn health(&self) -> Result<(), AgentError> {
        let response = self.client
            .get(self.url("/health"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::Status(response.status()));
        }

        Ok(())
    }
}
