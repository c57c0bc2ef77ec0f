use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::agent_client::ResearchAgent;
use crate::cache::ResearchCache;
use crate::config::{CacheConfig, ResearchAgentConfig};
use crate::error::AgentError;
use crate::fallback::ResponseFallbackGenerator;
use crate::normalizer::{parse_research_result, ResultNormalizer, EXECUTION_ID_PLACEHOLDER};
use crate::random::RandomSource;
use crate::types::{AgentResearchRequest, EligibilityResult, ResearchRequest, ResearchResult};

pub const UNAVAILABLE_ELIGIBILITY_FINDINGS: &str =
    "Eligibility research unavailable. Showing estimated eligibility.";

const RESEARCH_PROTOCOLS: &str = "\
        - Uniswap V4, Aave V3, Compound V3
        - Arbitrum, Optimism, zkSync, Base, Polygon zkEVM
        - Starknet, Scroll, Linea
        - Blur, OpenSea, LooksRare
        - LayerZero, Axelar, Wormhole";

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub profile: String,
    pub research_max_steps: u32,
    pub eligibility_max_steps: u32,
    pub request_timeout: Duration,
    pub health_timeout: Duration,
    pub cache_ttl: Duration,
}

impl OrchestratorSettings {
    pub fn from_config(agent: &ResearchAgentConfig, cache: &CacheConfig) -> Self {
        Self {
            profile: agent.profile.clone(),
            research_max_steps: agent.research_max_steps,
            eligibility_max_steps: agent.eligibility_max_steps,
            request_timeout: agent.request_timeout(),
            health_timeout: agent.health_timeout(),
            cache_ttl: cache.ttl(),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            profile: "crypto_analytics_agent".to_string(),
            research_max_steps: 25,
            eligibility_max_steps: 15,
            request_timeout: Duration::from_secs(120),
            health_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Drives research requests through cache, research agent, normalizer and
/// fallback. Research and eligibility answers never fail: every upstream
/// problem degrades to synthetic data.
pub struct ResearchOrchestrator {
    agent: Arc<dyn ResearchAgent>,
    cache: Arc<ResearchCache>,
    normalizer: ResultNormalizer,
    settings: OrchestratorSettings,
}

impl ResearchOrchestrator {
    pub fn new(
        agent: Arc<dyn ResearchAgent>,
        cache: Arc<ResearchCache>,
        rng: Arc<RandomSource>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            agent,
            cache,
            normalizer: ResultNormalizer::new(rng),
            settings,
        }
    }

    pub async fn research(&self, request: &ResearchRequest) -> ResearchResult {
        let key = request.cache_key();

        if let Some(entry) = self.cache.get(&key).await {
            if entry.created_at.elapsed() < self.settings.cache_ttl {
                debug!("Research cache hit for {}", key);
                return entry.value;
            }
        }
        debug!("Research cache miss for {}", key);

        match self.run_research(request).await {
            Ok(result) => {
                self.cache.put(key, result.clone()).await;
                result
            }
            Err(e) => {
                warn!(
                    "Research for {} failed, serving demo data: {}",
                    request.wallet_address, e
                );
                ResponseFallbackGenerator::generate_demo(&request.wallet_address)
            }
        }
    }

    async fn run_research(&self, request: &ResearchRequest) -> Result<ResearchResult, AgentError> {
        let agent_request = AgentResearchRequest {
            goal: research_goal(&request.wallet_address, request.timeframe_days),
            profile: self.settings.profile.clone(),
            max_steps: self.settings.research_max_steps,
            save_state: false,
        };

        info!("Researching airdrops for {} over {} days", request.wallet_address, request.timeframe_days);
        let payload = bounded(self.settings.request_timeout, self.agent.research(&agent_request)).await?;

        let result = match parse_research_result(&payload, &request.wallet_address) {
            Ok(result) => result,
            Err(e) => {
                warn!("Structured extraction failed, using fallback parser: {}", e);
                self.normalizer
                    .normalize(&payload, &request.wallet_address, Utc::now().date_naive())
            }
        };

        info!(
            "Research for {} completed: {} findings, total {}",
            request.wallet_address,
            result.found_airdrops.len(),
            result.total_estimated_value
        );
        Ok(result)
    }

    /// Single-protocol eligibility check. Not cached.
    pub async fn check_eligibility(&self, wallet_address: &str, protocol: &str) -> EligibilityResult {
        let agent_request = AgentResearchRequest {
            goal: eligibility_goal(wallet_address, protocol),
            profile: self.settings.profile.clone(),
            max_steps: self.settings.eligibility_max_steps,
            save_state: false,
        };

        info!("Checking {} eligibility for {}", protocol, wallet_address);
        match bounded(self.settings.request_timeout, self.agent.research(&agent_request)).await {
            Ok(payload) => self.normalizer.eligibility(&payload, protocol),
            Err(e) => {
                warn!(
                    "Eligibility check for {} on {} failed, serving estimate: {}",
                    wallet_address, protocol, e
                );
                self.normalizer
                    .synthetic_eligibility(protocol, UNAVAILABLE_ELIGIBILITY_FINDINGS)
            }
        }
    }

    /// True when the research agent answers its health endpoint in time.
    pub async fn agent_reachable(&self) -> bool {
        match bounded(self.settings.health_timeout, self.agent.health()).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Research agent health check failed: {}", e);
                false
            }
        }
    }

    pub async fn cache_size(&self) -> usize {
        self.cache.len().await
    }
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, AgentError>>,
) -> Result<T, AgentError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AgentError::Timeout(limit))?
}

fn research_goal(wallet_address: &str, timeframe_days: u32) -> String {
    format!(
        r#"
        Comprehensive airdrop research for wallet {wallet_address} from last {timeframe_days} days.

        CRITICAL: Return structured JSON data in this exact format:
        {{
            "wallet_address": "{wallet_address}",
            "found_airdrops": [
                {{
                    "protocol": "Protocol Name",
                    "eligible": true/false,
                    "estimated_value": 1000,
                    "deadline": "2024-12-31",
                    "requirements": ["req1", "req2"]
                }}
            ],
            "research_summary": "Detailed analysis summary...",
            "total_estimated_value": 5000,
            "execution_id": "{EXECUTION_ID_PLACEHOLDER}"
        }}

        Analyze these protocols specifically:
{RESEARCH_PROTOCOLS}

        Focus on:
        1. Current eligibility based on on-chain activity
        2. Accurate reward estimations
        3. Clear requirements and deadlines
        4. Official documentation links

        Return valid JSON only.
        "#
    )
}

fn eligibility_goal(wallet_address: &str, protocol: &str) -> String {
    format!(
        r#"
        Check airdrop eligibility for wallet {wallet_address} on {protocol}.
        Return JSON: {{"eligible": true/false, "estimated_reward": number, "requirements": [], "research_findings": "text"}}
        "#
    )
}
