use crate::types::{AirdropFinding, ResearchResult};

pub const DEMO_EXECUTION_ID: &str = "demo_fallback";

const DEMO_SUMMARY: &str = "AI analysis complete. Your wallet shows strong DeFi activity with \
significant liquidity provision and trading volume. You're eligible for major protocol airdrops. \
Focus on maintaining consistent activity across emerging Layer 2 solutions.";

/// Canned research answer served when the research agent cannot be reached.
/// The payload is identical on every call apart from the echoed wallet.
pub struct ResponseFallbackGenerator;

impl ResponseFallbackGenerator {
    pub fn generate_demo(wallet_address: &str) -> ResearchResult {
        let found_airdrops = vec![
            demo_finding(
                "Uniswap V4",
                true,
                1250.00,
                "2024-12-31",
                &["10+ swaps", "LP provider", "> $1000 volume", "Governance participation"],
            ),
            demo_finding(
                "Arbitrum Odyssey",
                true,
                750.00,
                "2024-11-15",
                &["Bridge > 0.1 ETH", "5+ transactions", "Use 3 dApps", "NFT holder"],
            ),
            demo_finding(
                "zkSync Era",
                false,
                520.00,
                "2024-10-30",
                &["Mainnet activity", "Early user", "Specific NFTs", "Bridge activity"],
            ),
        ];

        ResearchResult::new(
            wallet_address.to_string(),
            found_airdrops,
            DEMO_SUMMARY.to_string(),
            DEMO_EXECUTION_ID.to_string(),
        )
    }
}

fn demo_finding(
    protocol: &str,
    eligible: bool,
    estimated_value: f64,
    deadline: &str,
    requirements: &[&str],
) -> AirdropFinding {
    AirdropFinding {
        protocol: protocol.to_string(),
        eligible,
        estimated_value,
        deadline: deadline.to_string(),
        requirements: requirements.iter().map(|r| r.to_string()).collect(),
    }
}
