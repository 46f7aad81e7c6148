//! SpecFlow - Real-Time Microphone Spectrogram
//!
//! Opens a window showing a scrolling, log-frequency spectrogram of the
//! default (or chosen) input device and keeps summary statistics of every
//! capture session.

mod app;
mod cli;
mod input;
mod logging_setup;
mod window;

use anyhow::{Context, Result};
use clap::Parser;
use specflow_core::{AppSettings, JsonFileStore, KeyValueStore, MemoryStore};
use tracing::{info, warn};
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> Result<()> {
    let args = cli::Args::parse();

    if args.list_devices {
        let devices =
            specflow_core::list_input_devices().context("Failed to enumerate input devices")?;
        if devices.is_empty() {
            println!("No input devices found");
        }
        for name in devices {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut settings = match args.settings_path() {
        Some(path) => AppSettings::load(&path)
            .with_context(|| format!("Failed to load settings from {:?}", path))?,
        None => AppSettings::default(),
    };
    args.apply(&mut settings);
    settings.validate().context("Invalid settings")?;

    if args.write_config {
        let path = args.write_settings(&settings)?;
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    let _log_guard = logging_setup::init(&settings.log_config)?;

    info!("==========================================");
    info!("===      SpecFlow Session Started      ===");
    info!("==========================================");

    let source = input::InputSource::from_settings(&settings.capture, args.synthetic);
    let store: Box<dyn KeyValueStore> = if source.persists_results() {
        match JsonFileStore::open_default() {
            Ok(store) => {
                info!("Session statistics stored in {:?}", store.path());
                Box::new(store)
            }
            Err(e) => {
                warn!("Statistics will not be saved: {}", e);
                Box::new(MemoryStore::new())
            }
        }
    } else {
        Box::new(MemoryStore::new())
    };

    let mut app = app::App::new(settings, source, store)?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
