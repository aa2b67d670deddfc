//! UGS Pendant runner.
//!
//! Starts the pendant HTTP service against a simulated machine so the web
//! UI and API can be exercised without a controller attached.

mod cli;
mod config;
mod machine;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pendant_core::{HostBridge, PendantSettings};
use pendant_web::{PendantServer, ServerAddress, address};

use crate::cli::{Cli, Commands, ListenArgs, LogFormat};
use crate::config::AppConfig;
use crate::machine::SimulatedMachine;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (ignore errors if missing).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "info" }, cli.log_format);

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { listen, no_qr } => cmd_serve(config, &listen, !no_qr).await,
        Commands::Urls { listen } => cmd_urls(config, &listen),
        Commands::Config => cmd_config(&config),
    }
}

fn init_tracing(default_level: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

async fn cmd_serve(config: AppConfig, listen: &ListenArgs, show_qr: bool) -> Result<()> {
    let config = config.with_listen_args(listen);
    let settings = PendantSettings::new(config.pendant);

    let (bridge, mailbox) = HostBridge::channel();
    let server = PendantServer::new(config.server, settings, bridge);

    let mut machine = SimulatedMachine::new(server.control_state_listener());
    std::thread::Builder::new()
        .name("pendant-host".into())
        .spawn(move || {
            machine.connect();
            mailbox.run(&mut machine);
        })
        .context("failed to spawn simulated machine")?;

    let urls = server
        .start()
        .await
        .context("failed to start pendant server")?;

    println!("UGS Pendant is running. Open one of:");
    print_urls(&urls, show_qr);
    println!("Press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    tracing::info!("shutting down");
    server.stop().await;
    Ok(())
}

// ---------------------------------------------------------------------------
// urls
// ---------------------------------------------------------------------------

fn cmd_urls(config: AppConfig, listen: &ListenArgs) -> Result<()> {
    let config = config.with_listen_args(listen);
    let urls = address::resolve(config.server.bind_addr, config.server.port)
        .context("failed to resolve server URLs")?;
    print_urls(&urls, false);
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config(config: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(&config.pendant)
        .context("failed to serialize pendant configuration")?;
    println!("{json}");
    Ok(())
}

fn print_urls(urls: &[ServerAddress], show_qr: bool) {
    for url in urls {
        println!("  {url}");
        if !show_qr {
            continue;
        }
        match url.qr_code_unicode() {
            Ok(qr) => println!("{qr}"),
            Err(e) => tracing::warn!(url = url.url(), error = %e, "could not render QR code"),
        }
    }
}
