//! Application entry point: Audio Classifier.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse the command line (`--config`, `--input`).
//! 3. Load [`ConfigStore`] from the resolved settings file (fatal on error).
//! 4. Create the [`tokio`] runtime (multi-thread, 2 workers) for playback.
//! 5. Build the [`Player`] on the default cpal output.
//! 6. Run [`eframe::run_native`]; blocks the main thread until the window
//!    is closed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use audio_classifier::{
    app::ClassifierApp,
    audio::{CpalOutput, Player},
    config::{AppPaths, ConfigStore, Resolution},
};
use clap::Parser;
use eframe::egui;

#[derive(Parser)]
#[command(name = "audio-classifier")]
#[command(about = "Sort audio files into label folders by ear and by eye")]
struct Args {
    /// Settings file (defaults to ./config.toml, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to load instead of `input_directory` from the settings
    #[arg(short, long)]
    input: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(resolution: &Resolution) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Audio Classifier")
        .with_inner_size([resolution.width, resolution.height])
        .with_min_inner_size([640.0, 400.0]);

    match resolution.top_left() {
        Some((x, y)) => vp = vp.with_position(egui::pos2(x, y)),
        None if resolution.position.is_some() => {
            log::info!("edge-relative position in {resolution}; placement left to the window manager");
        }
        None => {}
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Audio Classifier starting up");

    // 2. Command line
    let args = Args::parse();

    // 3. Configuration
    let config_path = AppPaths::new().resolve(args.config.as_deref());
    let store = ConfigStore::load(&config_path)
        .with_context(|| format!("cannot start without settings ({})", config_path.display()))?;
    let resolution = store.config().window_resolution()?;
    log::info!("window geometry {resolution}");
    let input_directory = args
        .input
        .unwrap_or_else(|| store.config().input_directory.clone());

    // 4. Tokio runtime (playback runs on its blocking pool)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 5. Player
    let (player, playback_rx) = Player::new(rt.handle().clone(), Arc::new(CpalOutput));

    // 6. Build the egui app and run it (blocks until the window is closed)
    let app = ClassifierApp::new(store, player, playback_rx, &input_directory);
    let options = native_options(&resolution);

    eframe::run_native(
        "Audio Classifier",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("window closed with an error: {e}"))?;

    log::info!("Audio Classifier closing");
    Ok(())
}
