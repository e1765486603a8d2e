//! Log sink lifecycle.
//!
//! [`init`] installs a `tracing` subscriber for the current thread and hands
//! back a [`LogGuard`]; dropping the guard tears the sink down. Records go to
//! an append-only `sonar-sync.log` in the platform data dir, and to stderr
//! as well when verbose.

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_NAME: &str = "sonar-sync.log";

pub struct LogGuard {
    path: Option<PathBuf>,
    _default: DefaultGuard,
}

impl LogGuard {
    /// Where records are persisted, if a log file could be opened.
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        tracing::info!("Sonar Sync deactivated");
    }
}

pub fn init(verbose: bool) -> LogGuard {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = open_log_file();
    let path = log_file.as_ref().map(|(path, _)| path.clone());

    let file_layer = log_file.map(|(_, file)| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });
    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let guard = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .set_default();

    match &path {
        Some(path) => tracing::info!(path = %path.display(), "Sonar Sync is now active"),
        None => tracing::info!("Sonar Sync is now active (no log file)"),
    }

    LogGuard {
        path,
        _default: guard,
    }
}

fn open_log_file() -> Option<(PathBuf, File)> {
    let dirs = ProjectDirs::from("", "", "sonar-sync")?;
    let dir = dirs.data_local_dir();
    fs::create_dir_all(dir).ok()?;

    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    Some((path, file))
}
