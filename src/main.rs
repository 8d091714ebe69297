// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Distress Signal - console front end
//!
//! Started with `--open <status link>` it only renders the received status and exits.
//! Otherwise it probes the host, loads stored settings and runs the interactive console.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use distress::core::{EventBus, SessionController, SignalState};
use distress::db::{Database, MemoryStore, SettingsStore};
use distress::platform::Capabilities;
use distress::status::parse_status_link;
use distress::ui::{status_view, Console};
use distress::{Config, NAME, VERSION};

/// Distress Signal - siren, vibration and live location in one alert
#[derive(Parser, Debug)]
#[command(name = "distress")]
#[command(version = VERSION)]
#[command(about = "Personal safety signal with shareable status links")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Demo mode with simulated hardware
    #[arg(long)]
    demo: bool,

    /// Keep settings in memory only
    #[arg(long)]
    no_persist: bool,

    /// Open a received status link
    #[arg(long, value_name = "URL")]
    open: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // A status link renders and exits before anything else is set up
    if let Some(link) = &args.open {
        if let Some(snapshot) = parse_status_link(link) {
            println!("{}", status_view(&snapshot));
            return Ok(());
        }
    }

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;
    if args.demo {
        config.demo_mode = true;
    }

    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{} v{}", NAME, VERSION);
    if let Some(link) = &args.open {
        warn!("Not a status link, starting normally: {}", link);
    }
    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run_console(config, args.no_persist))
}

fn open_store(config: &Config, no_persist: bool) -> Arc<dyn SettingsStore> {
    if no_persist || !config.database.enabled {
        info!("Settings kept in memory only");
        return Arc::new(MemoryStore::new());
    }
    match Database::open(&config.database) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            warn!("Settings database unavailable, continuing in memory: {}", e);
            Arc::new(MemoryStore::new())
        }
    }
}

async fn run_console(config: Config, no_persist: bool) -> Result<()> {
    let caps = Capabilities::probe(&config);
    let store = open_store(&config, no_persist);

    let state = Arc::new(SignalState::new());
    let events = Arc::new(EventBus::default());
    let controller = SessionController::new(&config, &caps, state, events, store)?;

    let mut battery = controller.battery_monitor(&config, &caps);
    battery.start();

    let mut console = Console::new(controller, caps);
    tokio::select! {
        result = console.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    // Dropping the console deactivates any running session
    drop(console);
    battery.stop();
    info!("{} shutdown complete", NAME);
    Ok(())
}
