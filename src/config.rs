use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SonarError};

/// Name of the project-local config file looked up in the workspace root.
pub const LOCAL_CONFIG_FILE: &str = "sonar.json";

const TOKEN_ENV_VAR: &str = "SONAR_TOKEN";

/// Connection settings for one sync cycle.
///
/// The same field names are used by `sonar.json` and by the `[sonar]` table
/// of the settings file. Unset fields default to empty.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub host: String,
    pub token: String,
    pub project_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    /// Extra search params. Numbers and booleans are accepted and sent as
    /// their string form.
    #[serde(
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "scalar_params"
    )]
    pub query_params: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParamValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    Float(f64),
}

impl From<ParamValue> for String {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Text(text) => text,
            ParamValue::Flag(flag) => flag.to_string(),
            ParamValue::Integer(n) => n.to_string(),
            ParamValue::Float(n) => n.to_string(),
        }
    }
}

fn scalar_params<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, ParamValue>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}

#[derive(Deserialize, Default)]
struct SettingsFile {
    #[serde(default)]
    sonar: Config,
}

impl Config {
    /// Resolve the config for `workspace`: `sonar.json` wins when it exists
    /// and parses, otherwise the host settings file is used.
    pub fn load(workspace: &Path, settings_path: &Path) -> Result<Self> {
        let config = match Self::load_local(workspace) {
            Some(config) => config,
            None => Self::load_settings(settings_path)?,
        };

        Ok(config.with_token_fallback(std::env::var(TOKEN_ENV_VAR).ok()))
    }

    /// Read `<workspace>/sonar.json`. Read and parse failures are logged and
    /// reported as absent so the caller falls back to the settings file.
    pub fn load_local(workspace: &Path) -> Option<Self> {
        let path = workspace.join(LOCAL_CONFIG_FILE);
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Error reading sonar.json");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Using project-local config");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Error parsing sonar.json");
                None
            }
        }
    }

    /// Read the `[sonar]` table of the settings file. A missing file yields
    /// an all-empty config.
    pub fn load_settings(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| SonarError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: SettingsFile =
            toml::from_str(&contents).map_err(|e| SonarError::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(settings.sonar)
    }

    pub fn settings_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "sonar-sync")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .ok_or(SonarError::NoConfigDir)
    }

    /// Fill an empty token from the environment
    fn with_token_fallback(mut self, env_token: Option<String>) -> Self {
        if self.token.is_empty() {
            if let Some(token) = env_token.filter(|t| !t.is_empty()) {
                self.token = token;
            }
        }
        self
    }

    /// Cookie header value, treating an empty string as unset.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref().filter(|c| !c.is_empty())
    }
}

/// Something that can produce a fresh [`Config`] for each sync cycle.
pub trait ConfigSource {
    fn load(&self) -> Result<Config>;

    /// Files whose modification should be treated as a config change.
    fn watched_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Config resolved from a workspace directory and a settings file.
pub struct WorkspaceConfig {
    root: PathBuf,
    settings_path: PathBuf,
}

impl WorkspaceConfig {
    pub fn new(root: PathBuf, settings_path: PathBuf) -> Self {
        Self {
            root,
            settings_path,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ConfigSource for WorkspaceConfig {
    fn load(&self) -> Result<Config> {
        Config::load(&self.root, &self.settings_path)
    }

    fn watched_paths(&self) -> Vec<PathBuf> {
        vec![
            self.root.join(LOCAL_CONFIG_FILE),
            self.settings_path.clone(),
        ]
    }
}

impl ConfigSource for Config {
    fn load(&self) -> Result<Config> {
        Ok(self.clone())
    }
}
