//! Wire types for the server's REST responses.
//!
//! Everything is optional or defaulted: a partial payload still deserializes,
//! and the client decides what an absent field means.

use serde::Deserialize;

use crate::types::{IssueStatus, Severity};

/// Envelope of `GET /api/issues/search`.
#[derive(Deserialize, Default)]
pub struct IssueSearchResponse {
    pub issues: Option<Vec<RawIssue>>,
    pub paging: Option<RawPaging>,
    #[serde(default)]
    pub components: Vec<RawComponent>,
}

/// One issue record exactly as the server reports it.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawIssue {
    #[serde(default)]
    pub key: String,
    pub severity: Option<Severity>,
    #[serde(rename = "type", default)]
    pub issue_type: String,
    #[serde(default)]
    pub message: String,
    /// `"<projectKey>:<path>"`.
    #[serde(default)]
    pub component: String,
    pub line: Option<u32>,
    #[serde(default)]
    pub status: IssueStatus,
    pub text_range: Option<RawTextRange>,
    pub author: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawTextRange {
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    pub start_offset: Option<u32>,
    pub end_offset: Option<u32>,
}

#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawPaging {
    pub page_index: Option<u32>,
    pub page_size: Option<u32>,
    pub total: Option<u64>,
}

/// Component metadata; carries the branch or pull request the results apply to.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawComponent {
    pub branch: Option<String>,
    pub pull_request: Option<String>,
}

/// Envelope of `GET /api/project_branches/list`.
#[derive(Deserialize, Default)]
pub struct BranchesResponse {
    #[serde(default)]
    pub branches: Vec<RawBranch>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawBranch {
    pub name: String,
}
