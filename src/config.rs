//! Process configuration from environment variables

use crate::error::{OrchestrationError, Result};
use crate::models::Label;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_PORT: u16 = 8090;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_SEED: u64 = 42;

/// Which classifier backs the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RoutingStrategyKind {
    #[default]
    Lexical,
    Model,
}

impl RoutingStrategyKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "lexical" | "rules" | "keyword" => Some(Self::Lexical),
            "model" | "llm" => Some(Self::Model),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub port: u16,
    pub llm_timeout: Duration,
    pub routing_strategy: RoutingStrategyKind,
    pub default_label: Label,
    pub mock_data_seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            port: DEFAULT_PORT,
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            routing_strategy: RoutingStrategyKind::Lexical,
            default_label: Label::Spending,
            mock_data_seed: DEFAULT_SEED,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| OrchestrationError::InvalidConfig {
        key,
        value: raw.to_string(),
    })
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.gemini_api_key = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY"));

        if let Some(model) = get("GEMINI_MODEL") {
            config.gemini_model = model.trim().to_string();
        }

        if let Some(raw) = get("PORT").or_else(|| get("API_PORT")) {
            config.port = parse_number("PORT", &raw)?;
        }

        if let Some(raw) = get("LLM_TIMEOUT_SECS") {
            let secs: u64 = parse_number("LLM_TIMEOUT_SECS", &raw)?;
            if secs == 0 {
                return Err(OrchestrationError::InvalidConfig {
                    key: "LLM_TIMEOUT_SECS",
                    value: raw,
                });
            }
            config.llm_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = get("ROUTING_STRATEGY") {
            config.routing_strategy =
                RoutingStrategyKind::parse(&raw).ok_or(OrchestrationError::InvalidConfig {
                    key: "ROUTING_STRATEGY",
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = get("DEFAULT_LABEL") {
            config.default_label =
                Label::parse_token(&raw).ok_or(OrchestrationError::InvalidConfig {
                    key: "DEFAULT_LABEL",
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = get("MOCK_DATA_SEED") {
            config.mock_data_seed = parse_number("MOCK_DATA_SEED", &raw)?;
        }

        Ok(config)
    }
}
