mod cmd;
mod logging;
mod picker;

use clap::{Parser, ValueEnum};
use notion_tidy_core::CleanMode;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "ntidy",
    version,
    about = "Clean up knowledge-base exports by removing hashes and fixing links"
)]
pub struct Cli {
    /// Directory containing the export files (prompted for when omitted)
    pub directory: Option<PathBuf>,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Copy each file to a sibling backup before rewriting it
    #[arg(long)]
    pub backup: bool,

    /// How document content is cleaned (overrides config)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Folder rewritten links point into (overrides config)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Path to a config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Rebuild internal links from their display text
    Links,
    /// Only strip hash tokens from link targets
    Hashes,
}

impl From<ModeArg> for CleanMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Links => CleanMode::RewriteLinks,
            ModeArg::Hashes => CleanMode::StripHashes,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    cmd::clean::run(cli);
}
