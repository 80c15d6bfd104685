//! CLI argument definitions.

use clap::Parser;

/// Top-level CLI parser for `repocontext`.
#[derive(Debug, Parser)]
#[command(
    name = "repocontext",
    version,
    about = "Generate overview, getting-started and usage docs for a GitHub repository"
)]
pub struct Cli {
    /// Repository to document, as `user/repo` or `user/repo@tag`.
    #[arg(value_name = "user/repo[@tag]")]
    pub repo: String,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print only one section (overview, getting-started, usage) instead of
    /// the merged document.
    #[arg(long, value_name = "NAME")]
    pub section: Option<String>,
}
