mod issue;
mod paging;
mod severity;
mod sync;

pub use issue::{Issue, IssueStatus};
pub use paging::{PagingInfo, DEFAULT_PAGE_SIZE};
pub use severity::Severity;
pub use sync::SyncResult;
