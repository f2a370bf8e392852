//! Trading Assistant Server
//!
//! REST API server for per-user watchlists and generated insights.

use anyhow::{Context, bail};
use clap::Parser;
use std::sync::Arc;
use ta_server::api::create_router;
use ta_server::cli::{Cli, Command};
use ta_server::config::Config;
use ta_server::logging;
use ta_server::server::{DrainOutcome, Server};
use ta_server::state::AppState;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let args = match cli.command {
        Command::Version => {
            println!("{} version {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::ApiServer(args) => args,
    };

    let config = Config::resolve(cli.config.as_deref(), &args.overrides())
        .context("invalid configuration")?;

    logging::init(&config.logging, config.server.debug)
        .context("failed to initialize logging")?;

    info!(
        level = %config.logging.effective_level(config.server.debug),
        format = %config.logging.format,
        "logging initialized"
    );

    // Create application state
    let state = Arc::new(AppState::from_config(&config.server));

    let server = Server::new(config.server, create_router(state))?;
    let report = server.run().await;

    if report.outcome == DrainOutcome::Forced {
        info!("in-flight requests were dropped at the shutdown deadline");
    }
    if report.cause.is_failure() {
        bail!("server terminated: {}", report.cause);
    }

    Ok(())
}
