use chrono::{DateTime, Duration, Utc};
use rand::{Rng, RngCore};
use std::sync::Arc;

use crate::random::RandomSource;
use crate::types::{rfc3339_millis, ClaimHistory, ClaimReceipt, ClaimRecord};

pub const CLAIM_NETWORK: &str = "Ethereum Mainnet";
pub const CLAIM_STATUS_CONFIRMED: &str = "confirmed";

/// Produces synthetic claim receipts. Nothing is submitted to any chain and
/// the transaction hashes are random, not verifiable identifiers.
pub struct ClaimSimulator {
    rng: Arc<RandomSource>,
}

impl ClaimSimulator {
    pub fn new(rng: Arc<RandomSource>) -> Self {
        Self { rng }
    }

    pub fn claim(&self, wallet_address: &str, airdrop_id: &str, claim_amount: Option<f64>) -> ClaimReceipt {
        let (transaction_hash, claimed_amount, gas_used) = self.rng.with(|rng| {
            let amount = claim_amount.unwrap_or_else(|| rng.gen_range(100..1100) as f64);
            (random_tx_hash(rng), amount, rng.gen_range(50_000u64..150_000))
        });

        tracing::info!("Simulated airdrop claim: {} for {} ({})", airdrop_id, wallet_address, claimed_amount);

        ClaimReceipt {
            success: true,
            transaction_hash,
            claimed_amount,
            airdrop_id: airdrop_id.to_string(),
            timestamp: rfc3339_millis(Utc::now()),
            network: CLAIM_NETWORK.to_string(),
            gas_used,
            status: CLAIM_STATUS_CONFIRMED.to_string(),
        }
    }

    /// Placeholder history: two confirmed claims from the last two days.
    pub fn history(&self, wallet_address: &str) -> ClaimHistory {
        let now = Utc::now();
        let claims = vec![
            self.record("uniswap_v4", "Uniswap V4", 1250.00, now - Duration::days(1)),
            self.record("aave_v3", "Aave Protocol V3", 920.00, now - Duration::days(2)),
        ];
        let total_claimed = claims.iter().map(|c| c.amount).sum();

        ClaimHistory {
            wallet_address: wallet_address.to_string(),
            total_claimed,
            claims,
        }
    }

    fn record(&self, airdrop_id: &str, protocol: &str, amount: f64, at: DateTime<Utc>) -> ClaimRecord {
        ClaimRecord {
            airdrop_id: airdrop_id.to_string(),
            protocol: protocol.to_string(),
            amount,
            timestamp: rfc3339_millis(at),
            transaction_hash: self.rng.with(|rng| random_tx_hash(rng)),
            status: CLAIM_STATUS_CONFIRMED.to_string(),
        }
    }
}

fn random_tx_hash<R: RngCore>(rng: &mut R) -> String {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}
