use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "upkeep",
    about = "Upkeep - Run every package manager's updates in order and report the outcome",
    version
)]
pub struct Cli {
    /// TOML file describing the update tasks (defaults to the built-in macOS catalog)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check for and apply updates (default)
    Update(UpdateArgs),

    /// Run only the check commands and report which tasks have updates
    Check {
        #[command(flatten)]
        selection: Selection,

        /// Print the results as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// List the configured tasks in execution order
    List,

    /// Display installed package versions
    Versions,
}

#[derive(Args, Debug, Default, Clone)]
pub struct Selection {
    /// Run only these tasks (comma separated or repeated)
    #[arg(long, value_name = "TASK", value_delimiter = ',')]
    pub only: Vec<String>,

    /// Leave these tasks out (comma separated or repeated)
    #[arg(long, value_name = "TASK", value_delimiter = ',')]
    pub skip: Vec<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub selection: Selection,

    /// Exit non-zero when any task fails, not only required ones
    #[arg(long)]
    pub strict: bool,

    /// Don't print the package version table afterwards
    #[arg(long)]
    pub no_versions: bool,

    /// Don't install missing prerequisite tools
    #[arg(long)]
    pub skip_prerequisites: bool,

    /// Print the run summary as JSON on stdout (status lines move to stderr)
    #[arg(long)]
    pub json: bool,
}
