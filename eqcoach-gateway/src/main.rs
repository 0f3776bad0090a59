use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use eqcoach::{CoachConfig, Orchestrator, TurnProcessor};
use eqcoach_gateway::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "eqcoach-gateway", about = "EQ conversation coach HTTP gateway")]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "EQCOACH_BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind_addr: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `log` records from the core crate are bridged into tracing by the
    // subscriber's default log feature.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = CoachConfig::from_env();
    let orchestrator = Orchestrator::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build provider stack: {e}"))?;
    let processor = Arc::new(TurnProcessor::new(Arc::new(orchestrator)));

    let router = build_router(AppState::new(processor));
    let listener = TcpListener::bind(cli.bind_addr.as_str()).await?;
    tracing::info!(addr = %cli.bind_addr, "eqcoach gateway listening");
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
