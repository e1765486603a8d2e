//! One fetch → normalize → project → display cycle per trigger.

use std::path::{Path, PathBuf};

use crate::client::IssueSource;
use crate::config::ConfigSource;
use crate::diagnostics::project;
use crate::error::Result;
use crate::group::GroupingMode;
use crate::host::{Host, Notice, Status};
use crate::tree::build_tree;
use crate::types::{PagingInfo, SyncResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
    Succeeded,
    Failed,
}

/// What a trigger ended in, once the orchestrator is back to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced { total: u64 },
    Failed,
    /// Page navigation past the first or last page; nothing was fetched.
    AtBoundary,
}

pub struct SyncOrchestrator<C, S, H> {
    config: C,
    source: S,
    host: H,
    workspace_root: PathBuf,
    page_size: u32,
    mode: GroupingMode,
    state: SyncState,
    current: Option<SyncResult>,
}

impl<C, S, H> SyncOrchestrator<C, S, H>
where
    C: ConfigSource,
    S: IssueSource,
    H: Host,
{
    pub fn new(config: C, source: S, host: H, workspace_root: PathBuf, page_size: u32) -> Self {
        Self {
            config,
            source,
            host,
            workspace_root,
            page_size: page_size.max(1),
            mode: GroupingMode::default(),
            state: SyncState::Idle,
            current: None,
        }
    }

    pub fn with_grouping(mut self, mode: GroupingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn grouping(&self) -> GroupingMode {
        self.mode
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Paging of the last successful sync, or page 1 of nothing.
    pub fn paging(&self) -> PagingInfo {
        self.current
            .as_ref()
            .map(|result| result.paging)
            .unwrap_or_else(|| PagingInfo::empty(1, self.page_size))
    }

    pub async fn activate(&mut self) -> SyncOutcome {
        self.sync(1).await
    }

    pub async fn start(&mut self) -> SyncOutcome {
        self.sync(1).await
    }

    pub async fn on_config_changed(&mut self) -> SyncOutcome {
        tracing::info!("Configuration changed, re-syncing...");
        self.sync(1).await
    }

    pub async fn next_page(&mut self) -> SyncOutcome {
        let paging = self.paging();
        if !paging.has_next() {
            self.host.notify(Notice::info("Already on the last page."));
            return SyncOutcome::AtBoundary;
        }
        self.sync(paging.page_index + 1).await
    }

    pub async fn prev_page(&mut self) -> SyncOutcome {
        let paging = self.paging();
        if !paging.has_prev() {
            self.host.notify(Notice::info("Already on the first page."));
            return SyncOutcome::AtBoundary;
        }
        self.sync(paging.page_index - 1).await
    }

    /// Flip the grouping mode and re-render the last result. Never fetches.
    pub fn toggle_grouping(&mut self) -> GroupingMode {
        self.mode = self.mode.toggled();
        tracing::info!(mode = %self.mode, "Switching grouping mode");
        self.render_tree();
        self.mode
    }

    /// Run one full cycle for `page`. On failure the previously published
    /// diagnostics and tree are left exactly as they were.
    pub async fn sync(&mut self, page: u32) -> SyncOutcome {
        let page = page.max(1);
        self.state = SyncState::Syncing;
        tracing::info!(page, "Syncing issues");
        self.host.set_status(Status::Syncing { page });

        let fetched = self.fetch(page).await;
        let outcome = match fetched {
            Ok(result) => {
                let total = result.paging.total;
                tracing::info!(
                    fetched = result.issues.len(),
                    total,
                    "Successfully fetched issues"
                );
                self.apply(result);
                self.state = SyncState::Succeeded;
                self.host.set_status(Status::Ready { total });
                self.host.notify(Notice::info(format!(
                    "Sonar Sync: Found {total} issues. Showing page {page}."
                )));
                SyncOutcome::Synced { total }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch sonar issues");
                self.state = SyncState::Failed;
                self.host.set_status(Status::Error);
                self.host.notify(Notice::error(format!("Sonar Sync failed: {e}")));
                SyncOutcome::Failed
            }
        };

        self.state = SyncState::Idle;
        outcome
    }

    async fn fetch(&self, page: u32) -> Result<SyncResult> {
        let config = self.config.load()?;
        tracing::debug!(host = %config.host, project = %config.project_key, "Loaded config");
        self.source.fetch_issues(&config, page, self.page_size).await
    }

    fn apply(&mut self, result: SyncResult) {
        let by_file = project(&result.issues);
        tracing::info!(issues = result.issues.len(), "Updating diagnostics");

        self.host.clear_diagnostics();
        for (file, diagnostics) in by_file {
            let path = resolve(&self.workspace_root, &file);
            self.host.set_diagnostics(&path, diagnostics);
        }

        self.current = Some(result);
        self.render_tree();
    }

    fn render_tree(&mut self) {
        let Some(result) = &self.current else {
            return;
        };
        let nodes = build_tree(result, self.mode);
        self.host.show_tree(&nodes);
    }
}

/// Resolve a workspace-relative file to the path the host keys diagnostics by.
fn resolve(workspace_root: &Path, file: &str) -> PathBuf {
    workspace_root.join(file)
}
