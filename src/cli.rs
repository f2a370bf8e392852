//! Command line interface.

use crate::config::Overrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Trading assistant server.
#[derive(Debug, Parser)]
#[command(name = "ta-server", version, about)]
pub struct Cli {
    /// Configuration file. Defaults to `ta-server.toml` when present.
    #[arg(long, global = true, env = "TA_SERVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server.
    ApiServer(ApiServerArgs),
    /// Print the version.
    Version,
}

/// Flags of `api-server`.
#[derive(Debug, Default, Args)]
pub struct ApiServerArgs {
    /// Host to bind.
    #[arg(long, env = "TA_SERVER_HOST")]
    pub host: Option<String>,

    /// Port to bind.
    #[arg(long, env = "TA_SERVER_PORT")]
    pub port: Option<u16>,

    /// Enable payload logging and the /debug toggle.
    #[arg(long, env = "TA_SERVER_DEBUG")]
    pub debug: bool,

    /// DEBUG, INFO, WARN or ERROR.
    #[arg(long, env = "TA_SERVER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// json or text.
    #[arg(long, env = "TA_SERVER_LOG_FORMAT")]
    pub log_format: Option<String>,
}

impl ApiServerArgs {
    /// Configuration overrides from these flags.
    ///
    /// An unset `--debug` leaves the file value alone.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            debug: self.debug.then_some(true),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
        }
    }
}
