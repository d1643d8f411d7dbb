use clap::Parser;
use pulse_core::{PulseEngineConfig, INITIAL_BALANCE};
use pulse_service::{build_router, ServiceConfig, ServiceState};
use std::net::SocketAddr;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "pulsed", version, about = "PULSE social ledger service")]
struct Cli {
    /// Socket address to bind, e.g. 127.0.0.1:8090
    #[arg(long, default_value = "127.0.0.1:8090")]
    listen: SocketAddr,
    /// Seed the board with demo users and pulses on startup.
    #[arg(long, default_value_t = false)]
    seed_demo: bool,
    /// Tokens granted to each newly registered user.
    #[arg(long, default_value_t = INITIAL_BALANCE, env = "PULSE_INITIAL_BALANCE")]
    initial_balance: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "pulse_service=info,info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let state = ServiceState::bootstrap(ServiceConfig {
        engine: PulseEngineConfig {
            initial_balance: cli.initial_balance,
        },
        seed_demo: cli.seed_demo,
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!("pulse-service listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
