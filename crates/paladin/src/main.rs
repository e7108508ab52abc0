mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use paladin_runtime::Settings;
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();
    let project_root = resolve_project_root(cli.project_root.as_ref());
    paladin_runtime::config::load_dotenv(&project_root);

    // The hook sets up its own logging and must never fail
    if let Commands::Hook = &cli.command {
        commands::hook::execute(&project_root, cli.config.as_deref()).await;
        std::process::exit(0);
    }

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    paladin_runtime::init_logging(&level);

    // Handle init command early (doesn't need config)
    if let Commands::Init { path } = &cli.command {
        return commands::init::run_init(path);
    }

    // Load config
    let settings = Settings::load(cli.config.as_deref(), &project_root)?;

    match cli.command {
        Commands::Hook | Commands::Init { .. } => {}
        Commands::Install {
            hooks_file,
            dry_run,
            force,
        } => {
            commands::install::install(&hooks_file, &project_root, dry_run, force)?;
        }
        Commands::Uninstall {
            hooks_file,
            dry_run,
            keep_empty,
        } => {
            commands::install::uninstall(&hooks_file, &project_root, dry_run, keep_empty)?;
        }
        Commands::Doctor { hooks_file } => {
            commands::doctor::execute(&settings, &project_root, &hooks_file)?;
        }
        Commands::Guard(args) => {
            commands::tools::guard(&settings, &args).await?;
        }
        Commands::Heal { prompt, mode } => {
            commands::tools::heal(&settings, &prompt, mode.into()).await?;
        }
        Commands::Suggest(args) => {
            commands::tools::suggest(&settings, &args).await?;
        }
        Commands::Discuss(args) => {
            commands::tools::discuss(&settings, &args).await?;
        }
        Commands::Proceed { prompt } => {
            commands::tools::proceed(&prompt)?;
        }
    }

    Ok(())
}

/// `--project-root` with `~` expanded, else the working directory
fn resolve_project_root(arg: Option<&PathBuf>) -> PathBuf {
    let root = match arg {
        Some(path) => paladin_adapters::expand_path(&path.to_string_lossy()),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    std::fs::canonicalize(&root).unwrap_or(root)
}
