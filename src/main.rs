//! ocr-jobctl demo
//!
//! Stages assets, initializes the scripted engine, runs one recognition job
//! and prints every status publication until the job ends.

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{after, never, select};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ocr_jobctl::config::{self, AppConfig};
use ocr_jobctl::storage;
use ocr_jobctl::{JobController, OcrImage, OcrStatus, ScriptedEngine};

/// Run a cancellable OCR job and watch its progress
#[derive(Parser, Debug)]
#[command(name = "ocr-jobctl")]
#[command(about = "Run a cancellable OCR job and watch its progress")]
struct Args {
    /// Configuration file (defaults to <config dir>/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image to recognize (defaults to the sample image in the data directory)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Directory containing the tessdata subdirectory
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Recognition language(s), e.g. "eng" or "eng+deu"
    #[arg(short, long)]
    language: Option<String>,

    /// Directory of assets to stage into the data directory first
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Request a stop this many milliseconds after starting
    #[arg(long)]
    stop_after_ms: Option<u64>,

    /// Dispose the controller this many milliseconds after starting
    #[arg(long)]
    dispose_after_ms: Option<u64>,

    /// Print statuses as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_source) = load_or_create_config(args.config.as_deref())?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match config_source {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => info!("Using default configuration"),
    }

    run(args, config)
}

/// Load configuration from the given file, the default location, or defaults
fn load_or_create_config(explicit: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = config::load_config(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }

    if let Ok(config_dir) = storage::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                return Ok((config, Some(config_path)));
            }
        }
    }
    Ok((AppConfig::default(), None))
}

fn run(args: Args, config: AppConfig) -> Result<()> {
    let local_dir = match args.data_path.or(config.engine.data_path.clone()) {
        Some(dir) => dir,
        None => storage::get_data_dir()?,
    };

    if let Some(assets_dir) = args.assets.or(config.sample.assets_dir.clone()) {
        storage::extract_assets(&assets_dir, &local_dir)
            .with_context(|| format!("Failed to stage assets from {:?}", assets_dir))?;
    }

    let image_path = args
        .image
        .unwrap_or_else(|| storage::image_file(&local_dir, &config.sample.image_name));
    let image = OcrImage::open(&image_path)?;

    let engine = ScriptedEngine::new(
        &config.demo.transcript,
        Duration::from_millis(config.demo.step_delay_ms),
    );
    let controller = JobController::new(engine);
    let status_rx = controller.subscribe_status();

    let language = args.language.unwrap_or(config.engine.language.clone());
    controller.initialize(
        &storage::tess_data_path(&local_dir),
        &language,
        config.engine.mode,
    )?;

    controller.start(image)?;

    let stop_timer = args
        .stop_after_ms
        .map(|ms| after(Duration::from_millis(ms)))
        .unwrap_or_else(never);
    let dispose_timer = args
        .dispose_after_ms
        .map(|ms| after(Duration::from_millis(ms)))
        .unwrap_or_else(never);

    // Timers fire once; an `after` channel delivers a single message
    loop {
        select! {
            recv(status_rx) -> msg => {
                let status = msg.context("Status stream closed")?;
                print_status(&status, args.json)?;
                if status.is_terminal() {
                    break;
                }
            }
            recv(stop_timer) -> _ => {
                controller.stop();
            }
            recv(dispose_timer) -> _ => {
                controller.dispose();
            }
        }
    }

    let text = controller.result();
    if text.is_empty() {
        warn!("Recognition produced no text");
    }
    if args.json {
        println!("{}", serde_json::json!({ "result": text }));
    } else {
        println!("{}", text);
    }

    controller.dispose();
    Ok(())
}

fn print_status(status: &OcrStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(status)?);
    } else {
        println!("{}", status);
    }
    Ok(())
}
