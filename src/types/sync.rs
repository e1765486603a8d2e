use serde::Serialize;

use super::{Issue, PagingInfo};

/// One page of normalized issues plus the paging and branch metadata that
/// came with it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncResult {
    pub issues: Vec<Issue>,
    pub paging: PagingInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl SyncResult {
    /// A valid result with no issues on `page`.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            issues: Vec::new(),
            paging: PagingInfo::empty(page, page_size),
            branch: None,
        }
    }
}
