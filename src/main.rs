use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use gesturecontrol::bridge::{BridgeHandle, BridgeMessage};
use gesturecontrol::config::{ensure_default_config, AppConfig};
use gesturecontrol::{fallback, replay};
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Hand-gesture classifier bridge
#[derive(Parser, Debug)]
#[command(name = "gesturecontrol", version, about)]
struct Cli {
    /// Config file (default: ~/.gesturecontrol/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay recorded frame observations (JSON lines)
    #[arg(short, long, conflicts_with = "no_camera")]
    replay: Option<PathBuf>,

    /// Replay speed in frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Keyboard fallback mode (w/s zoom, a/d pan, space idle)
    #[arg(long)]
    no_camera: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the default config file and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);

    if cli.write_default_config {
        setup(Level::INFO)?;
        if ensure_default_config(&config_path).await? {
            info!("Default config written to {}", config_path.display());
        } else {
            warn!("Config {} already exists, left untouched", config_path.display());
        }
        return Ok(());
    }

    let config = AppConfig::load(&config_path).await?;
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.log_level()?
    };
    setup(level)?;
    debug!("Running with config: {:?}", config);

    let (frame_tx, frame_rx) = config.bridge.frame_channel();
    let bridge = BridgeHandle::spawn(Some(config.bridge.clone()), config.classifier, frame_rx)
        .map_err(|e| eyre!("Failed to spawn bridge: {}", e))?;

    let printer = spawn_printer(&bridge);
    let cancel = CancellationToken::new();

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            ctrl_c_cancel.cancel();
        }
    });

    if cli.no_camera {
        let stdin = BufReader::new(tokio::io::stdin());
        fallback::run_keyboard(stdin, &bridge, cancel.clone())
            .await
            .map_err(|e| eyre!("Keyboard fallback failed: {}", e))?;
    } else if let Some(path) = cli.replay {
        tokio::select! {
            _ = cancel.cancelled() => {}
            result = replay::run_replay(&path, cli.fps, frame_tx) => {
                result.map_err(|e| eyre!("Replay of {} failed: {}", path.display(), e))?;
            }
        }
    } else {
        info!("No frame source given, waiting for Ctrl-C (see --replay / --no-camera)");
        drop(frame_tx);
        cancel.cancelled().await;
    }

    bridge
        .shutdown()
        .await
        .map_err(|e| eyre!("Bridge shut down with error: {}", e))?;
    if let Err(e) = printer.await {
        warn!("Printer task failed: {}", e);
    }

    info!("Bye");
    Ok(())
}

/// Prints every bridge message as one JSON line on stdout
fn spawn_printer(bridge: &BridgeHandle) -> JoinHandle<()> {
    let mut messages = bridge.subscribe();
    tokio::spawn(async move {
        loop {
            match messages.recv().await {
                Ok(msg) => print_message(&msg),
                Err(RecvError::Lagged(n)) => warn!("Printer lagged, {} messages skipped", n),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn print_message(msg: &BridgeMessage) {
    match msg.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Could not encode message: {}", e),
    }
}

fn setup(level: Level) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    setup_logging_env(level);
    Ok(())
}

fn setup_logging_env(level: Level) {
    // stdout carries the messages, logs go to stderr
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
