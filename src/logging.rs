use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use storerate::domain::StoreError;

pub const LOG_ENV: &str = "STORERATE_LOG";
const DEFAULT_LOG_FILTER: &str = "info";

/// Expand `~` and environment variables in a user supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

/// The terminal belongs to the UI, so everything is logged to a file.
pub fn init_logging(log_file: &Path) -> Result<PathBuf, StoreError> {
    let path = expand_path(log_file);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_filter(filter),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| StoreError::LoadingFailed(format!("logging setup failed: {e}")))?;

    Ok(path)
}
