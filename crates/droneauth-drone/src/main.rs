// ============================================
// File: crates/droneauth-drone/src/main.rs
// ============================================
//! # Drone Entry Point
//!
//! ## Usage
//! ```bash
//! drone start --config config/drone.toml
//! drone start --id DRONE_002 --password secret_002 --ground-station 10.0.0.1:5000
//! drone validate --config config/drone.toml
//! ```
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use droneauth_drone::{Drone, DroneConfig};

// ============================================
// CLI Definition
// ============================================

/// DroneAuth drone client
#[derive(Parser, Debug)]
#[command(name = "drone")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Authenticate against the ground station
    Start {
        /// Path to configuration file
        #[arg(short, long, default_value = "config/drone.toml")]
        config: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "config/drone.toml")]
        config: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Values that take precedence over the config file.
#[derive(Args, Debug)]
struct Overrides {
    /// Drone identity
    #[arg(long)]
    id: Option<String>,

    /// Drone passphrase
    #[arg(long)]
    password: Option<String>,

    /// Ground station address (ip:port)
    #[arg(long)]
    ground_station: Option<SocketAddr>,
}

impl Overrides {
    fn apply(self, config: &mut DroneConfig) {
        if let Some(id) = self.id {
            config.drone.id = id;
        }
        if let Some(password) = self.password {
            config.drone.password = password;
        }
        if let Some(addr) = self.ground_station {
            config.network.ground_station = addr;
        }
    }
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start { config, overrides } => cmd_start(&config, overrides).await,
        Commands::Validate { config, overrides } => cmd_validate(&config, overrides).await,
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

async fn cmd_start(config_path: &Path, overrides: Overrides) -> anyhow::Result<()> {
    let config = load_config(config_path, overrides).await?;
    init_logging(&config.logging.level);
    info!(config = %config_path.display(), "Configuration loaded");

    let drone = Drone::new(config);
    if let Some(stats) = drone.run().await? {
        info!(
            requests = stats.requests,
            successes = stats.successes,
            failures = stats.failures,
            "Final statistics"
        );
    }
    Ok(())
}

async fn cmd_validate(config_path: &Path, overrides: Overrides) -> anyhow::Result<()> {
    let config = load_config(config_path, overrides).await?;

    println!("✅ Configuration is valid");
    println!();
    println!("Drone:");
    println!("   ID:             {}", config.drone.id);
    println!(
        "   Password:       {}",
        if config.drone.password.is_empty() { "(empty)" } else { "(set)" }
    );
    println!();
    println!("Network:");
    println!("   Bind:           {}", config.network.bind_addr);
    println!("   Ground station: {}", config.network.ground_station);
    println!();
    println!("Timing:");
    println!("   Start delay:    {:?}", config.timing.start_delay());
    println!("   Auth timeout:   {:?}", config.timing.auth_timeout());
    match config.timing.retry_interval() {
        Some(interval) => println!("   Retry interval: {interval:?}"),
        None => println!("   Retry interval: disabled"),
    }
    println!();

    Ok(())
}

// ============================================
// Helper Functions
// ============================================

/// Loads the config (or defaults when the file is missing), applies CLI
/// overrides and validates the result.
async fn load_config(path: &Path, overrides: Overrides) -> anyhow::Result<DroneConfig> {
    let mut config = if path.exists() {
        DroneConfig::load(path).await?
    } else {
        eprintln!("Config file {} not found, using defaults", path.display());
        DroneConfig::default()
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .ok();
}
