use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub service: ServiceConfig,
    pub research_agent: ResearchAgentConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub random: RandomConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchAgentConfig {
    pub base_url: String,
    pub profile: String,
    pub research_max_steps: u32,
    pub eligibility_max_steps: u32,
    pub request_timeout_secs: u64,
    pub health_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RandomConfig {
    /// Fixed seed for the synthetic data generators. Entropy-seeded when unset.
    pub seed: Option<u64>,
}

impl Config {
    /// Layered load: built-in defaults, then the optional config file, then
    /// `AIRDROP__SECTION__KEY` environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let config_builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("service.name", "Airdrop Claimer API")?
            .set_default("service.log_level", "info")?
            .set_default("research_agent.base_url", "http://localhost:8000")?
            .set_default("research_agent.profile", "crypto_analytics_agent")?
            .set_default("research_agent.research_max_steps", 25)?
            .set_default("research_agent.eligibility_max_steps", 15)?
            .set_default("research_agent.request_timeout_secs", 120)?
            .set_default("research_agent.health_timeout_secs", 5)?
            .set_default("cache.ttl_secs", 300)?
            .set_default("cache.max_entries", 10_000)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("AIRDROP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = config_builder.try_deserialize()?;
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ResearchAgentConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
