//! Console simulator for the code lock.
//!
//! Buttons are pressed by typing commands; the persistent store is a file,
//! so the code survives restarts.

mod command;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use codelock_controller::{
    AccessController, ControllerConfig, ControllerSnapshot, EventLoop, InputDispatcher,
    TimingConfig,
};
use codelock_core::format_code;
use codelock_hardware::{FileByteStore, StdDelay, mock::MockGpio};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use command::{Command, HELP};

/// How long to wait for a press to be applied.
const PRESS_TIMEOUT: Duration = Duration::from_secs(2);

/// Settle delay kept in `--fast` mode so the polling thread sleeps between
/// samples.
const FAST_SETTLE_MS: u32 = 1;

/// Digit-code access controller simulator
#[derive(Parser, Debug)]
#[command(name = "codelock")]
#[command(about = "Simulate a four-digit code lock on the console")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File backing the persistent store
    #[arg(short, long, default_value = "codelock.eeprom")]
    image: PathBuf,

    /// Store size in bytes, overriding the configuration
    #[arg(long)]
    capacity: Option<usize>,

    /// Skip settle and blink delays
    #[arg(long)]
    fast: bool,
}

fn load_config(args: &Args) -> anyhow::Result<ControllerConfig> {
    let mut config = match &args.config {
        Some(path) => ControllerConfig::from_json_file(path)?,
        None => ControllerConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config.storage_capacity = capacity;
    }
    if args.fast {
        config.timing = TimingConfig {
            settle_ms: FAST_SETTLE_MS,
            ..TimingConfig::instant()
        };
    }
    config.validate()?;
    Ok(config)
}

fn print_snapshot(snapshot: &ControllerSnapshot) {
    let on_off = |on: bool| if on { "on" } else { "off" };
    println!(
        "state={} cursor={} entry={} success={} reset-mode={}",
        snapshot.state,
        snapshot.cursor,
        format_code(&snapshot.entry),
        on_off(snapshot.success_led),
        on_off(snapshot.reset_mode_led),
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let store = FileByteStore::open(&args.image, config.storage_capacity)
        .with_context(|| format!("opening {}", args.image.display()))?;
    let gpio = MockGpio::new();

    let mut controller = AccessController::new(store, gpio.clone(), StdDelay, &config)?;
    let mut dispatcher = InputDispatcher::new(gpio.clone(), StdDelay, &config);
    dispatcher.configure()?;
    let status = controller.boot()?;
    info!("Booted from {} ({:?})", args.image.display(), status);

    let handle = EventLoop::spawn(controller);
    let mut sender = handle.sender();
    let polling = tokio::task::spawn_blocking(move || dispatcher.run(&mut sender));

    let mut updates = handle.subscribe();
    print_snapshot(&handle.snapshot());
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Status) => print_snapshot(&handle.snapshot()),
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Press(button)) => {
                updates.mark_unchanged();
                gpio.press(config.pins.button_pin(button));
                match tokio::time::timeout(PRESS_TIMEOUT, updates.changed()).await {
                    Ok(Ok(())) => print_snapshot(&updates.borrow_and_update()),
                    Ok(Err(_)) => bail!("Event loop stopped"),
                    Err(_) => warn!("{} press not applied within {:?}", button, PRESS_TIMEOUT),
                }
            }
            Err(e) => println!("{e}"),
        }
    }

    let controller = handle.shutdown().await?;
    polling.await??;
    info!("Stopped in {}", controller.state());
    Ok(())
}
