use serde::{Deserialize, Serialize};

use super::Severity;

/// A normalized code-quality finding, ready for projection.
///
/// Line numbers are 1-based, columns are 0-based offsets. `start_line` never
/// exceeds `end_line`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub message: String,
    /// Workspace-relative path, with the project key prefix stripped.
    pub file: String,
    pub line: u32,
    pub status: IssueStatus,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    #[default]
    Open,
    Closed,
    #[serde(other)]
    Other,
}
