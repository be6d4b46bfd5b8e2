//! iolink - Command line client for ifm IO-Link Masters
//!
//! Scans ports, monitors temperature sensors and discovers masters on the
//! local network.

mod config;
mod discover;
mod monitor;
mod scan;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use iolink_core::{IoLinkMaster, MonitorOptions, RequestMode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "iolink")]
#[command(about = "Scan, monitor and discover ifm IO-Link Masters")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "iolink.toml")]
    config: PathBuf,

    /// IP address of the IO-Link Master
    #[arg(short, long, global = true)]
    address: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Send requests as JSON POSTs instead of GETs
    #[arg(long, global = true)]
    post: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show status, product name and process data of every port
    Scan {
        /// Print the scan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Continuously read the temperature on one port
    Monitor(MonitorArgs),
    /// Look for IO-Link Masters in the ARP table
    Discover {
        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check connectivity and report the number of ports
    Status,
}

#[derive(ClapArgs, Debug)]
struct MonitorArgs {
    /// Port to monitor
    #[arg(short, long)]
    port: Option<u16>,

    /// Seconds between readings (at least 1)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Stop after this many seconds
    #[arg(short, long)]
    duration: Option<u64>,

    /// Warn above this temperature
    #[arg(long)]
    high: Option<f64>,

    /// Warn below this temperature
    #[arg(long)]
    low: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("iolink v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Command line overrides
    if let Some(address) = args.address {
        config.device.address = address;
    }
    if let Some(timeout) = args.timeout {
        config.device.timeout_secs = timeout;
    }
    if args.post {
        config.device.mode = RequestMode::Post;
    }

    info!(
        address = %config.device.address,
        timeout_secs = config.device.timeout_secs,
        mode = ?config.device.mode,
        "Configuration loaded"
    );

    match args.command {
        Command::Scan { json } => {
            let master = IoLinkMaster::new(config.to_master_config());
            scan::run(&master, json).await?;
        }
        Command::Monitor(monitor_args) => {
            let master = IoLinkMaster::new(config.to_master_config());
            let port = monitor_args.port.unwrap_or(config.monitor.port);
            let options = MonitorOptions {
                interval: Duration::from_secs(
                    monitor_args
                        .interval
                        .unwrap_or(config.monitor.interval_secs)
                        .max(1),
                ),
                duration: monitor_args
                    .duration
                    .or(config.monitor.duration_secs)
                    .map(Duration::from_secs),
            };
            let alerts = monitor::Alerts {
                high: monitor_args.high.or(config.monitor.high_alert),
                low: monitor_args.low.or(config.monitor.low_alert),
            };
            monitor::run(&master, port, options, alerts).await?;
        }
        Command::Discover { json } => {
            discover::run(&config.to_scanner_config(), &config.to_master_config(), json).await?;
        }
        Command::Status => {
            match IoLinkMaster::connect(config.to_master_config()).await {
                Ok(master) => {
                    println!("Connected to IO-Link Master at {}", master.address());
                    match master.try_port_count().await {
                        Ok(count) => println!("Total ports available: {}", count),
                        Err(e) => println!("Unable to read port count: {}", e),
                    }
                }
                Err(e) => {
                    println!("{}", e);
                    println!("Check the IP address and that the device is powered on");
                }
            }
        }
    }

    Ok(())
}
