use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

const DEFAULT_LEVEL: &str = "info";

/// Sends tracing output to `log_file`. Without a file, events are dropped:
/// the terminal belongs to the UI.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| io::Error::other(err.to_string()))?;

    tracing::info!(
        path = %path.display(),
        "mplus-tracker v{} starting with file logging",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}
