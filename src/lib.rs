//! Airdrop research service: forwards wallet research to an external AI
//! research agent, normalizes its answers into a fixed schema, and degrades
//! to synthetic data whenever the agent cannot help.

pub mod agent_client;
pub mod api;
pub mod cache;
pub mod claims;
pub mod config;
pub mod error;
pub mod fallback;
pub mod handlers;
pub mod normalizer;
pub mod orchestrator;
pub mod random;
pub mod types;
