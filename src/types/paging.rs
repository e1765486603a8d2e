use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Server-side cursor over issue result pages.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PagingInfo {
    /// 1-based.
    pub page_index: u32,
    pub page_size: u32,
    pub total: u64,
}

impl PagingInfo {
    pub fn empty(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index: page_index.max(1),
            page_size,
            total: 0,
        }
    }

    /// `ceil(total / page_size)`; zero when there is nothing to page through.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page_index) < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page_index > 1
    }
}

impl Default for PagingInfo {
    fn default() -> Self {
        Self::empty(1, DEFAULT_PAGE_SIZE)
    }
}
