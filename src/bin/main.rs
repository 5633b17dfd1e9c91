use banking_agent_router::{
    agent::Orchestrator,
    config::{AppConfig, RoutingStrategyKind},
    models::Query,
    telemetry::init_tracing,
};
use clap::Parser;

/// Route a single banking question and print the answer
#[derive(Parser, Debug)]
#[command(name = "orchestrator", version, about)]
struct Cli {
    /// The question to ask
    #[arg(required = true)]
    query: Vec<String>,

    /// Override ROUTING_STRATEGY
    #[arg(long, value_enum)]
    strategy: Option<RoutingStrategyKind>,

    /// Print the routing decision and answer as JSON
    #[arg(long)]
    json: bool,

    /// Log filter when RUST_LOG is unset
    #[arg(long, env = "ORCHESTRATOR_LOG", default_value = "warn")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    let mut config = AppConfig::from_env()?;
    if let Some(strategy) = cli.strategy {
        config.routing_strategy = strategy;
    }

    let orchestrator = Orchestrator::from_config(&config)?;
    let query = Query::new(cli.query.join(" "));

    let result = orchestrator.run(&query).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("\n=== ROUTING ===");
    println!("Label: {}", result.classification.label);
    if let Some(reason) = result.classification.fallback_reason() {
        println!("Fallback: {:?}", reason);
    } else if let Some(justification) = &result.classification.justification {
        println!("Reason: {}", justification);
    }
    println!("\n=== ANSWER ({}) ===", result.answer.status);
    println!("{}", result.answer.text);

    Ok(())
}
