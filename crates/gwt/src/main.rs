#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Command-line interface for managing Git worktrees via the libgwt crate.

use std::{
    env,
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use gwt_term::{Output, Quiet, Terminal};
use libgwt::{Config, GwtError, RepositoryHandle, WorktreeStore};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line argument definitions.
mod args;
/// Subcommand implementations.
mod commands;
/// Output helpers shared by commands.
mod ui;
/// Path, process and lookup helpers.
mod utils;

use args::{Cli, Commands, ListFormat};
use commands::{CreateParams, EditParams};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn";
/// Log filter used with `--verbose` when `RUST_LOG` is unset.
const VERBOSE_FILTER: &str = "gwt=debug,libgwt=debug";

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Resolve the configuration file and load it.
fn load_config(flag: Option<&str>) -> Result<(PathBuf, Config)> {
    let path = utils::config_path(flag)?;
    let config = Config::load(&path)?;
    Ok((path, config))
}

/// Report a top-level error; quiet mode still reports on stderr.
fn report_error(output: &dyn Output, quiet: bool, message: &str) {
    if quiet {
        eprintln!("{message}");
        return;
    }
    if let Err(display_err) = output.fail(message) {
        eprintln!("Failed to report error via output handler: {display_err:#}");
    }
    if let Err(finish_err) = output.finish() {
        eprintln!("Failed to flush output handler: {finish_err:#}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loaded = load_config(cli.config.as_deref());

    // Determine color output preference early for error handling
    let color = if cli.color {
        true
    } else if cli.no_color {
        false
    } else {
        io::stdout().is_terminal()
            && loaded
                .as_ref()
                .map_or(true, |(_, config)| config.display.color)
    };

    let quiet = cli.quiet;
    let output: Arc<dyn Output> = if quiet {
        Arc::new(Quiet)
    } else {
        Arc::new(Terminal::new(color))
    };

    let result = loaded.and_then(|(path, config)| run(cli, &output, &path, config));
    if let Err(e) = result {
        // Reset any existing colors only if color was enabled and stdout is a TTY
        if color && io::stdout().is_terminal() {
            print!("\x1b[0m");
            if let Err(flush_err) = io::stdout().flush() {
                eprintln!("Failed to flush stdout while resetting colors: {flush_err}");
            }
        }

        let exit_code = match e.downcast_ref::<GwtError>() {
            Some(err @ GwtError::UserAborted) => {
                if let Err(finish_err) = output.finish() {
                    eprintln!("Failed to flush output handler: {finish_err:#}");
                }
                err.exit_code()
            }
            Some(err) => {
                report_error(output.as_ref(), quiet, &format!("{e:#}"));
                err.exit_code()
            }
            None => {
                report_error(output.as_ref(), quiet, &format!("{e:#}"));
                1
            }
        };

        process::exit(exit_code);
    }
    Ok(())
}

/// Open the worktree store for the repository containing `dir`.
fn open_store(dir: &Path, config: &Config) -> Result<WorktreeStore> {
    let repo = RepositoryHandle::open(dir)?;
    Ok(WorktreeStore::new(repo, config))
}

/// Execute the selected CLI command using the provided output implementation.
fn run(cli: Cli, output: &Arc<dyn Output>, config_path: &Path, config: Config) -> Result<()> {
    let cwd = env::current_dir()?;
    let repo_dir = match &cli.repo_dir {
        Some(dir) => utils::absolute_from(&cwd, dir),
        None => cwd.clone(),
    };
    let no_prompt = cli.no_prompt || cli.quiet;
    let output = output.as_ref();
    debug!(repo_dir = %repo_dir.display(), config = %config_path.display(), "starting");

    match cli.command {
        Commands::Config { action } => commands::config(output, config_path, config, action),
        Commands::List { format, json } => {
            let store = open_store(&repo_dir, &config)?;
            let format = if json { ListFormat::Json } else { format };
            commands::list(&store, output, format, &cwd)
        }
        Commands::Create {
            branch,
            path,
            base,
            path_flag,
            force,
        } => {
            let store = open_store(&repo_dir, &config)?;
            let params = CreateParams {
                branch,
                path: path_flag.or(path),
                base,
                force,
            };
            commands::create(&store, output, &config, &cwd, params)
        }
        Commands::Remove { target, force } => {
            let store = open_store(&repo_dir, &config)?;
            commands::remove(&store, output, &target, force, no_prompt, &cwd)
        }
        Commands::Prune { dry_run } => {
            let store = open_store(&repo_dir, &config)?;
            commands::prune(&store, output, dry_run, no_prompt)
        }
        Commands::Switch { branch } => {
            let store = open_store(&repo_dir, &config)?;
            commands::switch(&store, output, &config, &cwd, &branch, no_prompt)
        }
        Commands::Edit {
            target,
            editor,
            wait,
            new_window,
        } => {
            let store = open_store(&repo_dir, &config)?;
            let params = EditParams {
                target,
                editor,
                wait,
                new_window,
            };
            commands::edit(&store, output, &config, &cwd, params, no_prompt)
        }
        Commands::Code { target } => {
            let store = open_store(&repo_dir, &config)?;
            let params = EditParams::with_editor(target, "code");
            commands::edit(&store, output, &config, &cwd, params, no_prompt)
        }
        Commands::Idea { target } => {
            let store = open_store(&repo_dir, &config)?;
            let params = EditParams::with_editor(target, "idea");
            commands::edit(&store, output, &config, &cwd, params, no_prompt)
        }
        Commands::Vim { target } => {
            let store = open_store(&repo_dir, &config)?;
            let params = EditParams::with_editor(target, "vim");
            commands::edit(&store, output, &config, &cwd, params, no_prompt)
        }
        Commands::Browse { edit } => {
            let store = open_store(&repo_dir, &config)?;
            commands::browse(&store, output, &config, &cwd, edit)
        }
    }
}
