use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::claims::ClaimSimulator;
use crate::handlers;
use crate::orchestrator::ResearchOrchestrator;

// App state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ResearchOrchestrator>,
    pub claims: Arc<ClaimSimulator>,
    pub service_name: Arc<String>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<ResearchOrchestrator>,
        claims: Arc<ClaimSimulator>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            claims,
            service_name: Arc::new(service_name.into()),
            started_at: Instant::now(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/research-airdrops", post(handlers::research_airdrops))
        .route("/api/check-eligibility", post(handlers::check_eligibility))
        .route("/api/claim-airdrop", post(handlers::claim_airdrop))
        .route("/api/claim-history/{wallet_address}", get(handlers::claim_history))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
        )
}
