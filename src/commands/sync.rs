use crate::cli::SyncArgs;
use crate::client::HttpIssueSource;
use crate::commands::Context;
use crate::error::{Result, SonarError};
use crate::host::TerminalHost;
use crate::orchestrator::{SyncOrchestrator, SyncOutcome};
use crate::output;

/// One activation-style cycle for the requested page.
pub async fn run(ctx: Context, args: SyncArgs) -> Result<()> {
    let workspace_root = ctx.config.root().to_path_buf();
    let mut orchestrator = SyncOrchestrator::new(
        ctx.config,
        HttpIssueSource::default(),
        TerminalHost::new(args.diagnostics),
        workspace_root,
        args.view.page_size,
    )
    .with_grouping(args.view.group_by);

    match orchestrator.sync(args.page).await {
        SyncOutcome::Failed => Err(SonarError::SyncFailed),
        SyncOutcome::Synced { .. } | SyncOutcome::AtBoundary => {
            let collection = orchestrator.host().diagnostics();
            if !args.diagnostics && !collection.is_empty() && !output::is_json_output() {
                output::print_message(&format!(
                    "{} diagnostics across {} files (use --diagnostics to list them)",
                    collection.len(),
                    collection.files().count()
                ));
            }
            Ok(())
        }
    }
}
