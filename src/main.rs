mod cli;
mod client;
mod commands;
mod config;
mod diagnostics;
mod error;
mod group;
mod host;
mod logging;
mod normalize;
mod orchestrator;
mod output;
mod responses;
mod session;
mod tree;
mod types;

use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Commands};
use commands::Context;
use config::{Config, WorkspaceConfig};
use error::Result;
use std::error::Error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = std::error::Error::source(cause);
            }
        }

        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set global output format
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    let workspace = match cli.workspace {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        // Commands that don't require config or logging
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sonar-sync", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run(&workspace).await?;
        }
        command => {
            let log = logging::init(cli.verbose);
            if cli.verbose {
                if let Some(path) = log.path() {
                    eprintln!("Logging to {}", path.display());
                }
            }

            let settings_path = match cli.settings {
                Some(path) => path,
                None => Config::settings_path()?,
            };
            let ctx = Context {
                config: WorkspaceConfig::new(workspace, settings_path),
            };

            match command {
                Commands::Sync(args) => {
                    commands::sync::run(ctx, args).await?;
                }
                Commands::Session(args) => {
                    commands::session::run(ctx, args).await?;
                }
                Commands::Branches => {
                    commands::branches::list(&ctx).await?;
                }
                Commands::Completions { .. } | Commands::Init => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
