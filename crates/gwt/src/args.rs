use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("color_mode")
        .args(["color", "no_color"])
))]
/// Top-level CLI options for gwt.
pub struct Cli {
    /// Read and write configuration at this path instead of ~/.gwt.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    /// Operate on the repository containing DIR (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub repo_dir: Option<String>,

    /// Enable colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Suppress all output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub no_prompt: bool,

    /// Log git invocations and other diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    /// The primary command to execute.
    pub command: Commands,
}

/// Layouts for `gwt list`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// One section per worktree with details beneath it
    #[default]
    Section,
    /// One aligned line per worktree: path, branch, status
    Simple,
    /// Machine-readable JSON array
    Json,
}

#[derive(Subcommand)]
/// CLI subcommands supported by gwt.
pub enum Commands {
    /// Show all worktrees of the repository
    #[command(alias = "ls")]
    List {
        /// Output layout
        #[arg(long, value_enum, default_value_t = ListFormat::Section)]
        format: ListFormat,

        /// Shorthand for --format json
        #[arg(long, conflicts_with = "format")]
        json: bool,
    },

    /// Create a worktree, creating the branch when it does not exist
    #[command(visible_aliases = ["add", "new"])]
    Create {
        /// Branch to check out
        branch: String,

        /// Target directory (defaults to <paths.base>/<branch> or ./<branch>)
        path: Option<String>,

        /// Start a new branch from this reference
        #[arg(short = 'b', long = "base", value_name = "REF")]
        base: Option<String>,

        /// Target directory; overrides the positional path
        #[arg(short = 'p', long = "path", value_name = "DIR")]
        path_flag: Option<String>,

        /// Create even if the target directory already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a worktree by branch, path, or a unique part of either
    #[command(visible_aliases = ["rm", "delete", "del"])]
    Remove {
        /// Branch name or path of the worktree
        target: String,

        /// Skip confirmation and delete the directory if git refuses
        #[arg(short, long)]
        force: bool,
    },

    /// Clean up records of worktrees whose directories are gone
    Prune {
        /// Show what would be pruned without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Open a shell in the worktree for a branch
    #[command(visible_aliases = ["sw", "checkout", "co"])]
    Switch {
        /// Branch whose worktree to enter
        branch: String,
    },

    /// Open a worktree in an editor
    #[command(visible_alias = "open")]
    Edit {
        /// Branch name or path of the worktree
        target: String,

        /// Editor to use (code, vim, nvim, emacs, nano, subl, idea, webstorm)
        #[arg(short, long)]
        editor: Option<String>,

        /// Wait for the editor to close before returning
        #[arg(long)]
        wait: bool,

        /// Open in a new editor window
        #[arg(long)]
        new_window: bool,
    },

    /// Open a worktree in Visual Studio Code (same as `edit -e code`)
    Code {
        /// Branch name or path of the worktree
        target: String,
    },

    /// Open a worktree in IntelliJ IDEA (same as `edit -e idea`)
    Idea {
        /// Branch name or path of the worktree
        target: String,
    },

    /// Open a worktree in Vim (same as `edit -e vim`)
    Vim {
        /// Branch name or path of the worktree
        target: String,
    },

    /// Pick a worktree interactively and open it
    #[command(visible_alias = "select")]
    Browse {
        /// Open the selection in an editor instead of a shell
        #[arg(long)]
        edit: bool,
    },

    /// Read or change configuration values
    Config {
        #[command(subcommand)]
        /// The configuration action to perform.
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
/// Actions of `gwt config`.
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Dotted key, e.g. editor.default
        key: String,
    },
    /// Set one value; an empty value clears optional keys
    Set {
        /// Dotted key, e.g. editor.default
        key: String,
        /// New value
        value: String,
    },
    /// Print every key and its value
    List,
}
