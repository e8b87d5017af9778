//! lux - play a stylesheet-driven light show over DMX.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use lux_config::{CONFIG_FILE_NAME, LuxConfig};
use lux_io::{ArtNetConnector, Backoff, Reconnecting, SerialConnector, StdoutSink};
use lux_ir::{load_devices, load_stylesheet, load_tree};
use lux_scene::{Runner, Ticker, apply_stylesheet};

/// Play the show in a project directory
#[derive(Parser)]
#[command(name = "lux")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the devices, the scene tree and the stylesheet
    project: PathBuf,

    /// Enable verbose logging and print every changed frame
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (default: <project>/lux.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Milliseconds between two frames
    #[arg(long, value_name = "N")]
    interval_ms: Option<u64>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<f64>,

    /// Load and check the show, then exit without sending anything
    #[arg(long)]
    dry_run: bool,
}

fn load_config(cli: &Cli) -> Result<LuxConfig> {
    let mut config = match &cli.config {
        Some(path) => LuxConfig::load_from_file(path)?,
        None => LuxConfig::load(&cli.project)?,
    };
    if cli.config.is_some() {
        config.merge_with_env();
    }
    if let Some(ms) = cli.interval_ms.filter(|ms| *ms > 0) {
        config.timing.interval_ms = ms;
    }
    config.log.verbose |= cli.verbose;
    Ok(config)
}

fn build_runner(project: &Path, config: &LuxConfig) -> Result<Runner> {
    let show = &config.show;
    let devices = load_devices(show.devices_path(project)).context("loading devices")?;
    let tree = load_tree(show.tree_path(project)).context("loading scene tree")?;
    let sheet = load_stylesheet(show.style_path(project)).context("loading stylesheet")?;

    let runner = Runner::new(apply_stylesheet(&tree, &sheet), devices, sheet.keyframes);
    tracing::info!("styled tree:\n{}", runner.tree().describe());
    Ok(runner)
}

fn attach_outputs(runner: &mut Runner, config: &LuxConfig) {
    let reconnect = &config.output.reconnect;
    let backoff = Backoff::new(
        Duration::from_millis(reconnect.initial_backoff_ms),
        Duration::from_millis(reconnect.max_backoff_ms),
    );

    if let Some(artnet) = &config.output.artnet {
        let connector = ArtNetConnector {
            target: artnet.target.clone(),
            universe: artnet.universe,
        };
        runner.add_sink(Box::new(Reconnecting::new(connector, backoff.clone())));
    }
    if let Some(serial) = &config.output.serial {
        let mut connector = SerialConnector::new(&serial.path);
        connector.chunk_size = serial.chunk_size;
        connector.chunk_delay = Duration::from_micros(serial.chunk_delay_us);
        runner.add_sink(Box::new(Reconnecting::new(connector, backoff)));
    }
    if config.log.verbose {
        runner.add_sink(Box::new(StdoutSink::new()));
    }
    if runner.sink_count() == 0 {
        tracing::warn!(
            "no output configured; add [output.artnet] or [output.serial] to {CONFIG_FILE_NAME}"
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let log_level = if config.log.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut runner = build_runner(&cli.project, &config)?;
    runner.preflight().context("show failed preflight")?;
    if cli.dry_run {
        tracing::info!("dry run, exiting");
        return Ok(());
    }

    attach_outputs(&mut runner, &config);

    let mut ticker = Ticker::new(Duration::from_millis(config.timing.interval_ms));
    if let Some(secs) = cli.duration {
        let end = Duration::try_from_secs_f64(secs).context("invalid --duration")?;
        ticker = ticker.with_end(end);
    }
    tracing::info!(interval_ms = ticker.interval().as_millis() as u64, "starting show");
    runner.run(ticker);
    Ok(())
}
