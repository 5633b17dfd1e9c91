use banking_agent_router::{
    agent::Orchestrator, api::start_server, config::AppConfig, telemetry::init_tracing,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    let config = AppConfig::from_env()?;

    init_tracing("info,tower_http=info");

    info!("Banking Agent Router - API Server");
    info!(
        port = config.port,
        strategy = ?config.routing_strategy,
        model = %config.gemini_model,
        "Configuration loaded"
    );

    let orchestrator = Arc::new(Orchestrator::from_config(&config)?);

    info!("Orchestrator initialized, starting API server");

    start_server(orchestrator, config.port).await?;

    Ok(())
}
