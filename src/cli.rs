use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::group::GroupingMode;
use crate::types::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "sonar-sync")]
#[command(about = "Sync SonarQube issues into diagnostics and a grouped issue tree", version)]
#[command(after_help = "EXAMPLES:
    sonar-sync sync                    Fetch the first page of issues
    sonar-sync sync --group-by file    Group the issue tree by file
    sonar-sync session                 Interactive sync with paging
    sonar-sync branches                List analyzed branches
    sonar-sync init                    Create sonar.json in the workspace")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root holding sonar.json (defaults to the current directory)
    #[arg(long, short = 'w', global = true)]
    pub workspace: Option<PathBuf>,

    /// Settings file used when sonar.json is absent or invalid
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show detailed error information and log to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one page of issues and render diagnostics and the issue tree
    #[command(after_help = "EXAMPLES:
    sonar-sync sync
    sonar-sync sync --page 2 --page-size 50
    sonar-sync sync --group-by file --diagnostics")]
    Sync(SyncArgs),
    /// Interactive session: sync, page through results, toggle grouping
    #[command(after_help = "EXAMPLES:
    sonar-sync session
    sonar-sync session --group-by file --debounce-ms 500")]
    Session(SessionArgs),
    /// List the project's analyzed branches
    #[command(after_help = "EXAMPLES:
    sonar-sync branches
    sonar-sync branches --format json")]
    Branches,
    /// Create sonar.json in the workspace interactively
    #[command(after_help = "EXAMPLES:
    sonar-sync init
    sonar-sync init --workspace ../service")]
    Init,
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    sonar-sync completions bash > ~/.bash_completion.d/sonar-sync
    sonar-sync completions zsh > ~/.zfunc/_sonar-sync")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
pub struct SyncArgs {
    /// Page to fetch (1-based)
    #[arg(long, short, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Also list every diagnostic per file
    #[arg(long, short)]
    pub diagnostics: bool,
}

#[derive(Args)]
pub struct SessionArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Milliseconds to wait for config file writes to settle before re-syncing
    #[arg(long, default_value = "200")]
    pub debounce_ms: u64,

    /// Also list every diagnostic per file after each sync
    #[arg(long, short)]
    pub diagnostics: bool,
}

#[derive(Args)]
pub struct ViewArgs {
    /// Issues per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=500))]
    pub page_size: u32,

    /// Group the issue tree by author or by file
    #[arg(long, short, value_enum, default_value = "author")]
    pub group_by: GroupingMode,
}
