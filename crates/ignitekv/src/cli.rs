//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use ignitekv_core::PackageManager;

/// Scaffold a JSON server on Cloudflare Workers KV and deploy it
///
/// Every flag is optional; whatever is omitted is asked for
/// interactively.
#[derive(Parser, Debug)]
#[command(name = "ignitekv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project name (used for the folder name and the KV namespace name)
    #[arg(short = 'n', long)]
    pub project_name: Option<String>,

    /// JSON database file path
    #[arg(short = 'j', long)]
    pub json_db: Option<Utf8PathBuf>,

    /// Install dependencies and run the deploy pipeline automatically
    #[arg(short = 'i', long, value_enum)]
    pub install_deps: Option<YesNo>,

    /// Package manager to use (implies --install-deps yes)
    #[arg(long = "package-manager", visible_alias = "pm")]
    pub package_manager: Option<PackageManager>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Explicit yes/no choice for `--install-deps`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        matches!(value, YesNo::Yes)
    }
}
