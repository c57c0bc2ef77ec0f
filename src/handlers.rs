use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde_json::json;

use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::types::{
    rfc3339_millis, ClaimHistory, ClaimReceipt, ClaimRequestBody, EligibilityRequestBody,
    EligibilityResult, ResearchRequest, ResearchRequestBody, ResearchResult,
    DEFAULT_TIMEFRAME_DAYS,
};

fn required(value: Option<String>, message: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::InvalidInput(message.to_string())),
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let reachable = state.orchestrator.agent_reachable().await;
    let cache_size = state.orchestrator.cache_size().await;

    let (status, agent_status) = if reachable {
        ("healthy", "connected")
    } else {
        ("degraded", "disconnected")
    };

    let mut body = json!({
        "status": status,
        "timestamp": rfc3339_millis(chrono::Utc::now()),
        "service": state.service_name.as_str(),
        "research_agent": agent_status,
        "cache_size": cache_size,
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
    });
    if !reachable {
        body["warning"] = json!("Using fallback mode");
    }

    Json(body)
}

pub async fn research_airdrops(
    State(state): State<AppState>,
    payload: Result<Json<ResearchRequestBody>, JsonRejection>,
) -> AppResult<Json<ResearchResult>> {
    let Json(payload) = payload?;
    let wallet_address = required(payload.wallet_address, "Wallet address is required")?;

    let request = ResearchRequest::new(
        wallet_address,
        payload.timeframe_days.unwrap_or(DEFAULT_TIMEFRAME_DAYS),
    );

    Ok(Json(state.orchestrator.research(&request).await))
}

pub async fn check_eligibility(
    State(state): State<AppState>,
    payload: Result<Json<EligibilityRequestBody>, JsonRejection>,
) -> AppResult<Json<EligibilityResult>> {
    let Json(payload) = payload?;
    let wallet_address = required(payload.wallet_address, "Wallet address is required")?;
    let protocol = required(payload.protocol, "Protocol is required")?;

    Ok(Json(state.orchestrator.check_eligibility(&wallet_address, &protocol).await))
}

pub async fn claim_airdrop(
    State(state): State<AppState>,
    payload: Result<Json<ClaimRequestBody>, JsonRejection>,
) -> AppResult<Json<ClaimReceipt>> {
    let Json(payload) = payload?;
    let wallet_address = required(payload.wallet_address, "Wallet address is required")?;
    let airdrop_id = required(payload.airdrop_id, "Airdrop id is required")?;

    if let Some(amount) = payload.claim_amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::InvalidInput(format!("Invalid claim amount: {}", amount)));
        }
    }

    Ok(Json(state.claims.claim(&wallet_address, &airdrop_id, payload.claim_amount)))
}

pub async fn claim_history(
    Path(wallet_address): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ClaimHistory>> {
    let wallet_address = required(Some(wallet_address), "Wallet address is required")?;
    Ok(Json(state.claims.history(&wallet_address)))
}
