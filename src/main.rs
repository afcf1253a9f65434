use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use navis::adapters::{InMemoryChart, StaticMarketData};
use navis::cli::Cli;
use navis::config::Settings;
use navis::domain::{CapabilityCatalog, ExecutionContext};
use navis::orchestrator::Orchestrator;
use navis::parser::CommandParser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Arc::new(Settings::new_with_cli(&cli)?);

    let session_id = Uuid::new_v4().to_string();
    info!(%session_id, symbol = %cli.symbol, "session started");

    let Some(command) = cli.command_text() else {
        let registry = navis::default_registry(
            Arc::new(InMemoryChart::new()),
            Arc::new(StaticMarketData::new()),
        );
        println!("{}", serde_json::to_string_pretty(&registry.status())?);
        return Ok(());
    };

    if cli.parse_only {
        let catalog = CapabilityCatalog::new(settings.catalog.clone());
        let parser = CommandParser::new(&catalog, settings.engine.parameter_window);
        let plan = parser.parse(&command, Some(session_id));
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let registry = navis::default_registry(
        Arc::new(InMemoryChart::new()),
        Arc::new(StaticMarketData::new()),
    );
    let orchestrator = Orchestrator::new(registry, settings);

    let ctx = ExecutionContext::new(session_id).with_symbol(cli.symbol);
    let response = orchestrator
        .handle(&ctx, "process-chart-command", &json!({ "command": command }))
        .await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
