use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const DEFAULT_TIMEFRAME_DAYS: u32 = 30;

/// RFC 3339 in UTC with millisecond precision, used for every timestamp we emit.
pub fn rfc3339_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Agents write `null` for fields they leave out.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// Inbound request bodies. Required fields are optional here so that a
// missing field surfaces as a 400 with our own message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResearchRequestBody {
    pub wallet_address: Option<String>,
    pub timeframe_days: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EligibilityRequestBody {
    pub wallet_address: Option<String>,
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimRequestBody {
    pub wallet_address: Option<String>,
    pub airdrop_id: Option<String>,
    pub claim_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchRequest {
    pub wallet_address: String,
    pub timeframe_days: u32,
}

impl ResearchRequest {
    pub fn new(wallet_address: impl Into<String>, timeframe_days: u32) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            timeframe_days,
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            wallet_address: self.wallet_address.clone(),
            timeframe_days: self.timeframe_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirdropFinding {
    pub protocol: String,
    pub eligible: bool,
    pub estimated_value: f64,
    pub deadline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub wallet_address: String,
    pub found_airdrops: Vec<AirdropFinding>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub research_summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_estimated_value: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub execution_id: String,
}

impl ResearchResult {
    /// Builds a result whose total is derived from the eligible findings.
    pub fn new(
        wallet_address: String,
        found_airdrops: Vec<AirdropFinding>,
        research_summary: String,
        execution_id: String,
    ) -> Self {
        let total_estimated_value = eligible_total(&found_airdrops);
        Self {
            wallet_address,
            found_airdrops,
            research_summary,
            total_estimated_value,
            execution_id,
        }
    }

    pub fn recompute_total(&mut self) {
        self.total_estimated_value = eligible_total(&self.found_airdrops);
    }
}

pub fn eligible_total(findings: &[AirdropFinding]) -> f64 {
    findings
        .iter()
        .filter(|f| f.eligible)
        .map(|f| f.estimated_value)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub wallet_address: String,
    pub timeframe_days: u32,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.wallet_address, self.timeframe_days)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub protocol: String,
    pub estimated_reward: f64,
    pub requirements: Vec<String>,
    pub research_findings: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub success: bool,
    pub transaction_hash: String,
    pub claimed_amount: f64,
    pub airdrop_id: String,
    pub timestamp: String,
    pub network: String,
    pub gas_used: u64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub airdrop_id: String,
    pub protocol: String,
    pub amount: f64,
    pub timestamp: String,
    pub transaction_hash: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimHistory {
    pub wallet_address: String,
    pub total_claimed: f64,
    pub claims: Vec<ClaimRecord>,
}

// Upstream research agent wire types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResearchRequest {
    pub goal: String,
    pub profile: String,
    pub max_steps: u32,
    pub save_state: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: String,
    #[serde(default)]
    pub execution_id: Option<String>,
}
