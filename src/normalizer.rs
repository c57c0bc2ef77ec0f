use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AgentError;
use crate::random::RandomSource;
use crate::types::{AgentResearchResponse, AirdropFinding, EligibilityResult, ResearchResult};

const REFERENCE_PROTOCOLS: &[&str] = &[
    "Uniswap", "Aave", "Compound", "Arbitrum", "Optimism", "zkSync", "Starknet",
];

const PROTOCOL_VERSIONS: &[&str] = &["V2", "V3", "V4", "Ecosystem", "Odyssey", "Quests"];

const REQUIREMENT_VOCABULARY: &[&str] = &[
    "10+ transactions",
    "LP provider",
    "> $1000 volume",
    "Governance participation",
    "Bridge activity",
    "NFT holder",
    "Complete quests",
    "Social verification",
    "Early user",
    "Specific token",
    "Multi-chain",
    "Staking",
    "Lending",
];

const REQUIREMENTS_PER_FINDING: usize = 4;

const DEFAULT_SUMMARY: &str = "Comprehensive airdrop research completed. Found multiple \
opportunities based on your wallet's on-chain activity across DeFi and Layer 2 ecosystems.";

const ELIGIBILITY_REQUIREMENTS: &[&str] = &[
    "Active participation",
    "Minimum transactions",
    "Specific token holdings",
];

pub const DEFAULT_ELIGIBILITY_FINDINGS: &str = "Eligibility research completed.";

/// Returns the slice between the first `{` and the last `}` of `text`.
///
/// Opportunistic: text holding several JSON blocks yields a span that will
/// not parse, which callers treat as "no structured answer".
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Id the research prompt shows in its JSON template. Agents that copy the
/// template verbatim echo it back.
pub const EXECUTION_ID_PLACEHOLDER: &str = "unique_id";

pub fn fresh_execution_id() -> String {
    format!("exec_{}", Uuid::new_v4().simple())
}

// Envelope id first, then the id embedded in the answer, then a fresh one.
fn resolve_execution_id(payload: &AgentResearchResponse, embedded: &str) -> String {
    match payload.execution_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ if !embedded.is_empty() && embedded != EXECUTION_ID_PLACEHOLDER => embedded.to_string(),
        _ => fresh_execution_id(),
    }
}

/// Parses a structured research answer out of the agent's free text.
///
/// The wallet always comes from the request and the total is recomputed from
/// the eligible findings. The envelope execution id wins over the embedded
/// one; a blank or template id becomes a fresh one.
pub fn parse_research_result(
    payload: &AgentResearchResponse,
    wallet_address: &str,
) -> Result<ResearchResult, AgentError> {
    let json_str = extract_json_object(&payload.result)
        .ok_or_else(|| AgentError::MalformedPayload("no JSON object in agent result".to_string()))?;

    let mut result: ResearchResult = serde_json::from_str(json_str)
        .map_err(|e| AgentError::MalformedPayload(e.to_string()))?;

    if let Some(bad) = result
        .found_airdrops
        .iter()
        .find(|f| !f.estimated_value.is_finite() || f.estimated_value < 0.0)
    {
        return Err(AgentError::MalformedPayload(format!(
            "invalid estimated_value {} for {}",
            bad.estimated_value, bad.protocol
        )));
    }

    result.wallet_address = wallet_address.to_string();
    result.execution_id = resolve_execution_id(payload, &result.execution_id);
    result.recompute_total();

    Ok(result)
}

#[derive(Debug, Deserialize)]
struct AgentEligibility {
    eligible: bool,
    #[serde(default)]
    estimated_reward: f64,
    #[serde(default)]
    requirements: Vec<String>,
    #[serde(default)]
    research_findings: String,
}

/// Best-effort synthesis of research and eligibility answers when the agent
/// replied without usable structure. The values are random placeholders and
/// carry no information about the wallet.
pub struct ResultNormalizer {
    rng: Arc<RandomSource>,
}

impl ResultNormalizer {
    pub fn new(rng: Arc<RandomSource>) -> Self {
        Self { rng }
    }

    pub fn normalize(
        &self,
        payload: &AgentResearchResponse,
        wallet_address: &str,
        today: NaiveDate,
    ) -> ResearchResult {
        let found_airdrops = self.rng.with(|rng| {
            REFERENCE_PROTOCOLS
                .iter()
                .map(|protocol| synthetic_finding(rng, protocol, today))
                .collect::<Vec<_>>()
        });

        let research_summary = if payload.result.trim().is_empty() {
            DEFAULT_SUMMARY.to_string()
        } else {
            payload.result.clone()
        };

        let execution_id = resolve_execution_id(payload, "");

        ResearchResult::new(
            wallet_address.to_string(),
            found_airdrops,
            research_summary,
            execution_id,
        )
    }

    /// Uses the agent's structured eligibility verdict when present,
    /// otherwise a synthetic one wrapping the agent text.
    pub fn eligibility(&self, payload: &AgentResearchResponse, protocol: &str) -> EligibilityResult {
        let parsed = extract_json_object(&payload.result)
            .and_then(|json_str| serde_json::from_str::<AgentEligibility>(json_str).ok());

        match parsed {
            Some(verdict) => EligibilityResult {
                eligible: verdict.eligible,
                protocol: protocol.to_string(),
                estimated_reward: if verdict.estimated_reward.is_finite() {
                    verdict.estimated_reward.max(0.0)
                } else {
                    0.0
                },
                requirements: verdict.requirements,
                research_findings: if verdict.research_findings.is_empty() {
                    payload.result.clone()
                } else {
                    verdict.research_findings
                },
            },
            None => {
                let findings = if payload.result.trim().is_empty() {
                    DEFAULT_ELIGIBILITY_FINDINGS
                } else {
                    payload.result.as_str()
                };
                self.synthetic_eligibility(protocol, findings)
            }
        }
    }

    pub fn synthetic_eligibility(&self, protocol: &str, research_findings: &str) -> EligibilityResult {
        let (eligible, estimated_reward) = self.rng.with(|rng| {
            (rng.gen_bool(0.5), rng.gen_range(100..1600) as f64)
        });

        EligibilityResult {
            eligible,
            protocol: protocol.to_string(),
            estimated_reward,
            requirements: ELIGIBILITY_REQUIREMENTS.iter().map(|r| r.to_string()).collect(),
            research_findings: research_findings.to_string(),
        }
    }
}

fn synthetic_finding<R: Rng>(rng: &mut R, protocol: &str, today: NaiveDate) -> AirdropFinding {
    let version = PROTOCOL_VERSIONS.choose(rng).copied().unwrap_or("V2");
    let eligible = rng.gen_bool(0.7);
    let estimated_value = rng.gen_range(100..2100) as f64;
    let deadline = today + Duration::days(rng.gen_range(30..210));

    let mut requirements: Vec<&str> = REQUIREMENT_VOCABULARY.to_vec();
    requirements.shuffle(rng);
    requirements.truncate(REQUIREMENTS_PER_FINDING);

    AirdropFinding {
        protocol: format!("{} {}", protocol, version),
        eligible,
        estimated_value,
        deadline: deadline.format("%Y-%m-%d").to_string(),
        requirements: requirements.into_iter().map(String::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn payload(result: &str, execution_id: Option<&str>) -> AgentResearchResponse {
        AgentResearchResponse {
            result: result.to_string(),
            execution_id: execution_id.map(String::from),
        }
    }

    fn normalizer(seed: u64) -> ResultNormalizer {
        ResultNormalizer::new(Arc::new(RandomSource::seeded(seed)))
    }

    #[test]
    fn test_extract_json_object_spans_outer_braces() {
        let text = "Here you go: {\"a\": {\"b\": 1}} done";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_parse_research_result_recomputes_total() {
        let text = r#"Analysis:
        {
            "wallet_address": "0xother",
            "found_airdrops": [
                {"protocol": "Scroll", "eligible": true, "estimated_value": 300, "deadline": "2025-06-01", "requirements": ["Bridge"]},
                {"protocol": "Linea", "eligible": false, "estimated_value": 900, "deadline": "2025-07-01", "requirements": []}
            ],
            "research_summary": "Two candidates",
            "total_estimated_value": 99999,
            "execution_id": ""
        }"#;

        let result = parse_research_result(&payload(text, Some("agent-7")), "0xabc").unwrap();
        assert_eq!(result.wallet_address, "0xabc");
        assert_eq!(result.found_airdrops.len(), 2);
        assert_eq!(result.total_estimated_value, 300.0);
        assert_eq!(result.execution_id, "agent-7");
        assert_eq!(result.research_summary, "Two candidates");
    }

    #[test]
    fn test_parse_research_result_accepts_null_fields() {
        let text = r#"{
            "wallet_address": null,
            "found_airdrops": [
                {"protocol": "Scroll", "eligible": true, "estimated_value": 300, "deadline": "2025-06-30", "requirements": null}
            ],
            "research_summary": "Scroll looks good",
            "total_estimated_value": null,
            "execution_id": null
        }"#;

        let result = parse_research_result(&payload(text, None), "0xabc").unwrap();
        assert_eq!(result.wallet_address, "0xabc");
        assert_eq!(result.found_airdrops[0].protocol, "Scroll");
        assert!(result.found_airdrops[0].requirements.is_empty());
        assert_eq!(result.total_estimated_value, 300.0);
        assert!(result.execution_id.starts_with("exec_"));
    }

    #[test]
    fn test_parse_research_result_replaces_template_execution_id() {
        let text = format!(r#"{{"found_airdrops": [], "execution_id": "{EXECUTION_ID_PLACEHOLDER}"}}"#);

        let result = parse_research_result(&payload(&text, Some("agent-1")), "0xabc").unwrap();
        assert_eq!(result.execution_id, "agent-1");

        let first = parse_research_result(&payload(&text, None), "0xabc").unwrap();
        let second = parse_research_result(&payload(&text, None), "0xabc").unwrap();
        assert!(first.execution_id.starts_with("exec_"));
        assert_ne!(first.execution_id, second.execution_id);
    }

    #[test]
    fn test_parse_research_result_keeps_embedded_execution_id() {
        let text = r#"{"found_airdrops": [], "execution_id": "run-42"}"#;
        let result = parse_research_result(&payload(text, None), "0xabc").unwrap();
        assert_eq!(result.execution_id, "run-42");
    }

    #[test]
    fn test_parse_research_result_rejects_unstructured_text() {
        let err = parse_research_result(&payload("nothing structured", None), "0xabc").unwrap_err();
        assert!(matches!(err, AgentError::MalformedPayload(_)));

        let err = parse_research_result(&payload("{ not json }", None), "0xabc").unwrap_err();
        assert!(matches!(err, AgentError::MalformedPayload(_)));
    }

    #[test]
    fn test_parse_research_result_rejects_negative_values() {
        let text = r#"{"found_airdrops": [{"protocol": "X", "eligible": true, "estimated_value": -5, "deadline": "2025-01-01"}]}"#;
        assert!(parse_research_result(&payload(text, None), "0xabc").is_err());
    }

    #[test]
    fn test_normalize_covers_reference_protocols() {
        let result = normalizer(7).normalize(&payload("", None), "0xabc", today());

        assert_eq!(result.found_airdrops.len(), REFERENCE_PROTOCOLS.len());
        for (finding, protocol) in result.found_airdrops.iter().zip(REFERENCE_PROTOCOLS) {
            assert!(finding.protocol.starts_with(protocol));
            assert!((100.0..2100.0).contains(&finding.estimated_value));
            assert_eq!(finding.requirements.len(), REQUIREMENTS_PER_FINDING);
            let unique: HashSet<_> = finding.requirements.iter().collect();
            assert_eq!(unique.len(), REQUIREMENTS_PER_FINDING);

            let deadline = NaiveDate::parse_from_str(&finding.deadline, "%Y-%m-%d").unwrap();
            let days_ahead = (deadline - today()).num_days();
            assert!((30..210).contains(&days_ahead));
        }
        assert_eq!(result.research_summary, DEFAULT_SUMMARY);
        assert!(result.execution_id.starts_with("exec_"));
    }

    #[test]
    fn test_normalize_total_matches_eligible_sum() {
        for seed in 0..20 {
            let result = normalizer(seed).normalize(&payload("raw text", Some("e-1")), "0xabc", today());
            let expected: f64 = result
                .found_airdrops
                .iter()
                .filter(|f| f.eligible)
                .map(|f| f.estimated_value)
                .sum();
            assert_eq!(result.total_estimated_value, expected);
            assert_eq!(result.research_summary, "raw text");
            assert_eq!(result.execution_id, "e-1");
        }
    }

    #[test]
    fn test_normalize_is_reproducible_with_seed() {
        let a = normalizer(11).normalize(&payload("", Some("id")), "0xabc", today());
        let b = normalizer(11).normalize(&payload("", Some("id")), "0xabc", today());
        assert_eq!(a, b);
    }

    #[test]
    fn test_eligibility_uses_agent_verdict() {
        let text = r#"{"eligible": true, "estimated_reward": 420, "requirements": ["Bridge"], "research_findings": "Active bridger"}"#;
        let result = normalizer(1).eligibility(&payload(text, None), "Scroll");

        assert!(result.eligible);
        assert_eq!(result.protocol, "Scroll");
        assert_eq!(result.estimated_reward, 420.0);
        assert_eq!(result.requirements, vec!["Bridge".to_string()]);
        assert_eq!(result.research_findings, "Active bridger");
    }

    #[test]
    fn test_eligibility_synthesizes_when_unstructured() {
        let result = normalizer(1).eligibility(&payload("looks promising", None), "Scroll");

        assert_eq!(result.protocol, "Scroll");
        assert!((100.0..1600.0).contains(&result.estimated_reward));
        assert_eq!(result.requirements.len(), ELIGIBILITY_REQUIREMENTS.len());
        assert_eq!(result.research_findings, "looks promising");

        let empty = normalizer(1).eligibility(&payload("", None), "Scroll");
        assert_eq!(empty.research_findings, DEFAULT_ELIGIBILITY_FINDINGS);
    }
}
