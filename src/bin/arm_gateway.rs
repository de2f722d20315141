//! Public gateway for robotic arm control
//!
//! Accepts long-lived client connections, validates each command message,
//! and forwards it to the controller's relay listener. Runs on the same
//! machine as the controller or anywhere that can reach it.

use anyhow::{Context, Result};
use armd::{GatewayConfig, IngressServer};
use clap::Parser;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "arm-gateway")]
#[command(about = "Gateway server forwarding arm commands to the motion controller")]
#[command(version)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Gateway bind host (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Gateway port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Robot controller host (overrides config)
    #[arg(long)]
    robot_host: Option<String>,

    /// Robot controller port (overrides config)
    #[arg(long)]
    robot_port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let mut config = match &args.config {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_host = bind;
    }
    if let Some(port) = args.port {
        config.bind_port = port;
    }
    if let Some(host) = args.robot_host {
        config.robot_host = host;
    }
    if let Some(port) = args.robot_port {
        config.robot_port = port;
    }

    info!("Gateway Server for Robotic Arm Control");
    info!("{}", "=".repeat(50));
    info!("Will forward commands to robot at {}", config.robot_addr());

    // Reachability probe, warn-only: commands are still accepted even if
    // the controller comes up later.
    match tokio::time::timeout(
        Duration::from_secs(2),
        TcpStream::connect(config.robot_addr()),
    )
    .await
    {
        Ok(Ok(_)) => info!("Robot controller is reachable at {}", config.robot_addr()),
        _ => {
            warn!("Robot controller is not reachable at {}", config.robot_addr());
            warn!("Commands will be received but may not be forwarded to the robot");
        }
    }

    // Bind failure (port already in use) aborts with a non-zero exit.
    let server = IngressServer::bind(&config.bind_addr(), config.robot_addr())
        .await
        .with_context(|| format!("Failed to start gateway on {}", config.bind_addr()))?;

    info!("Server started successfully, use Ctrl+C to stop");
    server.run().await;
    Ok(())
}
