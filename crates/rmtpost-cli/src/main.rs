//! Binary entrypoint for the RMT request server.
//!
//! Commands:
//! - `serve [--bind <addr>]` - run the HTTP listener (default)
//! - `init` - write a starter configuration file
//!
//! Without a peripheral driver the server runs against the simulated
//! channel from `rmtpost_hardware::mock`, logging every command it would
//! send to the hardware.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use rmtpost_controller::Dispatcher;
use rmtpost_hardware::mock;
use rmtpost_network::HttpServer;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rmtpost")]
#[command(about = "Pulse-train transmitter driven by HTTP POST bodies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "rmtpost.toml", global = true)]
    config: PathBuf,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP listener
    Serve {
        /// Address to listen on, overriding the configuration file
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Write a default configuration file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Init => {
            init_logging("info", cli.verbose);
            init_config(&cli.config).await
        }
        Commands::Serve { bind } => {
            let mut config = Config::load(&cli.config).await?;
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            init_logging(&config.logging.level, cli.verbose);
            serve(config).await
        }
    }
}

fn init_logging(level: &str, verbose: u8) {
    let level = match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        warn!("Config file {} already exists, leaving it untouched", path.display());
        return Ok(());
    }
    Config::create_default(path).await?;
    info!("Wrote default configuration to {}", path.display());
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting rmtpost v{}", rmtpost_core::VERSION);

    let (mut peripherals, _handle) =
        mock::peripherals_with_capacity(&config.channel, config.simulation.event_log_capacity)?;
    peripherals
        .initialize(&config.channel)
        .await
        .context("Failed to initialize transmit channel")?;

    let mut server = HttpServer::bind(config.server.to_http_config(), Dispatcher::new(peripherals))
        .await
        .context("Failed to start HTTP server")?;

    server
        .serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    let stats = serde_json::to_string(server.stats())?;
    info!(stats = %stats, "Server stopped");
    Ok(())
}
