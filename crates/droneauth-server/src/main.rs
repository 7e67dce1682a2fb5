// ============================================
// File: crates/droneauth-server/src/main.rs
// ============================================
//! # Ground Station Entry Point
//!
//! ## Creation Reason
//! Main entry point for the ground station binary. Handles CLI parsing,
//! logging setup, and server start.
//!
//! ## Usage
//! ```bash
//! ground-station start --config config/ground_station.toml
//! ground-station validate --config config/ground_station.toml
//! ```
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use droneauth_server::{GroundStationConfig, Server};

// ============================================
// CLI Definition
// ============================================

/// DroneAuth ground station
#[derive(Parser, Debug)]
#[command(name = "ground-station")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the ground station
    Start {
        /// Path to configuration file
        #[arg(short, long, default_value = "config/ground_station.toml")]
        config: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "config/ground_station.toml")]
        config: PathBuf,
    },
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start { config } => cmd_start(&config).await,
        Commands::Validate { config } => cmd_validate(&config).await,
    };

    if let Err(e) = result {
        init_logging("info");
        error!("{e:#}");
        std::process::exit(1);
    }
}

// ============================================
// Commands
// ============================================

/// Starts the server.
async fn cmd_start(config_path: &Path) -> anyhow::Result<()> {
    let config = load_or_default_config(config_path).await?;
    init_logging(&config.logging.level);
    info!(config = %config_path.display(), "Configuration loaded");

    let server = Server::new(config);
    if let Some(stats) = server.run().await? {
        info!(%stats, "Final statistics");
    }
    Ok(())
}

/// Validates configuration file.
async fn cmd_validate(config_path: &Path) -> anyhow::Result<()> {
    if !config_path.exists() {
        println!("⚠️  Config file not found: {}", config_path.display());
        println!("   Ground station will use default values.");
        return Ok(());
    }

    let config = GroundStationConfig::load(config_path).await?;

    println!("✅ Configuration is valid");
    println!();
    println!("Network:");
    println!("   Listen:     {}", config.listen_addr());
    println!();
    println!("Authorized drones ({}):", config.authorized().len());
    for identity in config.authorized() {
        println!("   {identity}");
    }
    println!();

    Ok(())
}

// ============================================
// Helper Functions
// ============================================

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .ok();
}

/// Loads config, or defaults when the file is missing.
async fn load_or_default_config(path: &Path) -> anyhow::Result<GroundStationConfig> {
    if path.exists() {
        Ok(GroundStationConfig::load(path).await?)
    } else {
        eprintln!("Config file {} not found, using defaults", path.display());
        Ok(GroundStationConfig::default())
    }
}
