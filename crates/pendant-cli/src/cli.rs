//! CLI argument definitions for the pendant runner.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// UGS Pendant -- remote control surface for a G-code sender.
#[derive(Parser)]
#[command(
    name = "ugs-pendant",
    version,
    about = "UGS Pendant -- remote control surface for a G-code sender",
    long_about = "Serves the pendant web UI and HTTP control API so a phone, tablet or \
                  second workstation can jog the machine, send commands and watch the \
                  machine state."
)]
pub struct Cli {
    /// Settings file (TOML).  Defaults to `config/pendant.toml` if present.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the pendant server against a simulated machine.
    Serve {
        #[command(flatten)]
        listen: ListenArgs,

        /// Do not print QR codes for the server URLs.
        #[arg(long)]
        no_qr: bool,
    },

    /// Print the URLs the server would advertise.
    Urls {
        #[command(flatten)]
        listen: ListenArgs,
    },

    /// Print the effective pendant configuration as JSON.
    Config,
}

/// Overrides for the `[server]` settings.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ListenArgs {
    /// Address to bind the HTTP server to.
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Port to listen on (0 picks a free port).
    #[arg(long, short)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single-line output.
    Compact,
    /// One JSON object per event.
    Json,
}
