use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airdrop_research_service::agent_client::HttpResearchAgent;
use airdrop_research_service::api::{create_router, AppState};
use airdrop_research_service::cache::ResearchCache;
use airdrop_research_service::claims::ClaimSimulator;
use airdrop_research_service::config::Config;
use airdrop_research_service::orchestrator::{OrchestratorSettings, ResearchOrchestrator};
use airdrop_research_service::random::RandomSource;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.service.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("Starting {}", config.service.name);

    let agent = HttpResearchAgent::new(
        &config.research_agent.base_url,
        config.research_agent.request_timeout(),
    )?;
    let cache = Arc::new(ResearchCache::new(config.cache.max_entries));
    let rng = Arc::new(RandomSource::from_optional_seed(config.random.seed));

    let orchestrator = ResearchOrchestrator::new(
        Arc::new(agent),
        cache,
        rng.clone(),
        OrchestratorSettings::from_config(&config.research_agent, &config.cache),
    );

    let state = AppState::new(
        Arc::new(orchestrator),
        Arc::new(ClaimSimulator::new(rng)),
        config.service.name.clone(),
    );
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on {}", addr);
    info!("Research agent: {}", config.research_agent.base_url);

    axum::serve(listener, app).await?;

    Ok(())
}
