use std::fmt;

use colored::Colorize;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Issue severity as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Blocker,
    Critical,
    Major,
    Minor,
    Info,
    /// Any value the server reports that is not one of the known levels.
    Other(String),
}

impl Severity {
    /// Parse a server severity string. Never fails; unknown values are kept.
    pub fn from_server(value: &str) -> Self {
        match value {
            "BLOCKER" => Severity::Blocker,
            "CRITICAL" => Severity::Critical,
            "MAJOR" => Severity::Major,
            "MINOR" => Severity::Minor,
            "INFO" => Severity::Info,
            other => Severity::Other(other.to_string()),
        }
    }

    /// The server's spelling of this severity.
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Blocker => "BLOCKER",
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Info => "INFO",
            Severity::Other(value) => value,
        }
    }

    /// Get the colored label for terminal output.
    pub fn colored(&self) -> String {
        let label = self.as_str();
        match self {
            Severity::Blocker | Severity::Critical => label.red().bold().to_string(),
            Severity::Major => label.yellow().bold().to_string(),
            Severity::Minor => label.blue().to_string(),
            Severity::Info => label.bright_black().to_string(),
            Severity::Other(_) => label.to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Severity::from_server(&value))
    }
}
