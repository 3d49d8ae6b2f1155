use anyhow::{Result, anyhow};
use std::{fs, path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

pub mod app_core;
pub mod config;
pub mod database;
pub mod domain;
pub mod key_handler;
pub mod player;
pub mod providers;
pub mod tui;
pub mod ui_state;

pub use config::Settings;
pub use database::Database;

// ~30fps
pub const REFRESH_RATE: Duration = Duration::from_millis(33);

pub const APP_NAME: &str = "tunedeck";

/// Platform data directory (database, logs). Created on first use.
pub fn data_dir() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory!"))?
        .join(APP_NAME);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory!"))?
        .join(APP_NAME);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Route tracing output to a log file; stderr belongs to the terminal UI.
pub fn init_tracing() -> Result<()> {
    let log_path = data_dir()?.join("tunedeck.log");
    let file = fs::File::create(log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tunedeck=info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

pub enum DurationStyle {
    Clean,
    Compact,
}

pub fn get_readable_duration(duration: Duration, style: DurationStyle) -> String {
    let mut secs = duration.as_secs();
    let mins = secs / 60;
    secs %= 60;

    match style {
        DurationStyle::Clean => match mins {
            0 => format!("{secs:02}s"),
            _ => format!("{mins}m {secs:02}s"),
        },
        DurationStyle::Compact => format!("{mins}:{secs:02}"),
    }
}
