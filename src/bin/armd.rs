//! Arm motion-controller daemon
//!
//! Runs the relay listener and the simulation tick loop in one process:
//! commands arrive over the relay transport, queue up, and drain one per
//! tick into the motion dispatcher.

use anyhow::{Context, Result};
use armd::{command_queue, ArmController, ControllerConfig, RelayListener, SimArm};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "armd")]
#[command(about = "Robotic arm motion controller with a command relay listener")]
#[command(version)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Relay listener bind host (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Relay listener port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

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
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => ControllerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_host = bind;
    }
    if let Some(port) = args.port {
        config.bind_port = port;
    }

    info!("Robotic Arm Controller Daemon");
    info!("{}", "=".repeat(50));
    info!(
        "Movement increments - Horizontal: {} Vertical: {} radians",
        config.motion.horizontal_increment, config.motion.vertical_increment
    );
    info!("Tick interval: {}ms", config.tick_interval_ms);

    let (producer, consumer) = command_queue();

    // Bind failure (port already in use) aborts with a non-zero exit.
    let relay = RelayListener::bind(&config.bind_addr(), producer)
        .await
        .with_context(|| format!("Failed to bind relay listener on {}", config.bind_addr()))?;
    tokio::spawn(relay.run());

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            info!("Shutdown requested");
            shutdown.store(true, Ordering::Relaxed);
        });
    }

    let mut controller = ArmController::new(SimArm::new(), &config, consumer, shutdown);
    controller.run().await;

    info!("Shutdown complete");
    Ok(())
}
