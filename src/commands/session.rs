use std::time::Duration;

use crate::cli::SessionArgs;
use crate::client::HttpIssueSource;
use crate::commands::Context;
use crate::config::ConfigSource;
use crate::error::Result;
use crate::host::TerminalHost;
use crate::orchestrator::SyncOrchestrator;
use crate::session;

pub async fn run(ctx: Context, args: SessionArgs) -> Result<()> {
    let workspace_root = ctx.config.root().to_path_buf();
    let watched = ctx.config.watched_paths();
    tracing::info!(
        workspace = %workspace_root.display(),
        watched = watched.len(),
        "Starting interactive session"
    );

    let mut orchestrator = SyncOrchestrator::new(
        ctx.config,
        HttpIssueSource::default(),
        TerminalHost::new(args.diagnostics),
        workspace_root,
        args.view.page_size,
    )
    .with_grouping(args.view.group_by);

    session::run(
        &mut orchestrator,
        watched,
        Duration::from_millis(args.debounce_ms),
    )
    .await
}
