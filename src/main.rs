//! Binary entry point: load config, start file logging, open the configured
//! store, and drive the Ratatui event loop until the user exits.
use std::fs::{self, File};
use std::sync::Mutex;

use anyhow::{Context, Result};
use band_schedule_manager::config::LogConfig;
use band_schedule_manager::{open_gateway, run_app, App, AppConfig, Dashboard, EntityStore};
use chrono::Local;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let (config, config_error) = match AppConfig::load(None) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    init_logging(&config.log)?;
    if let Some(err) = config_error {
        warn!(error = %err, "falling back to default config");
    }

    let gateway = open_gateway(&config.storage).context("failed to open storage")?;
    let store = EntityStore::new(gateway);
    let today = Local::now().date_naive();
    let dashboard = Dashboard::load(store, today, config.schedule.seed_months)
        .context("failed to load schedules")?;
    info!(
        songs = dashboard.songs().len(),
        members = dashboard.members().len(),
        schedules = dashboard.schedules().len(),
        "dashboard loaded"
    );

    let mut app = App::new(dashboard, config.display.locale, today);
    run_app(&mut app)
}

/// Log to a file; the terminal belongs to the TUI. `RUST_LOG` wins over the
/// configured level.
fn init_logging(config: &LogConfig) -> Result<()> {
    let path = config.file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
