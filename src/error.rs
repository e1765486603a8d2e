use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SonarError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file at {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Missing setting `{0}`. Add it to sonar.json or the [sonar] table of the settings file")]
    MissingSetting(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to watch config files: {0}")]
    Watch(#[from] notify::Error),

    #[error("Sync did not complete")]
    SyncFailed,
}

pub type Result<T> = std::result::Result<T, SonarError>;
