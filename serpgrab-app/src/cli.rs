use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Config file merged when `--config` is not given, if present.
pub const DEFAULT_CONFIG_FILE: &str = "serpgrab.yaml";

/// Collect search-result titles and links; starts the terminal UI by default.
#[derive(Debug, Parser)]
#[command(name = "serpgrab", version, about)]
pub struct Cli {
    /// YAML/TOML/JSON config file (must exist).
    #[arg(long, global = true, env = "SERPGRAB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one collection without the UI and write the downloads.
    Collect(CollectArgs),
}

#[derive(Debug, Args)]
pub struct CollectArgs {
    #[arg(short, long)]
    pub query: String,

    /// Result pages to walk (1-100); defaults to `search.default_pages`.
    #[arg(short, long)]
    pub pages: Option<u32>,

    /// Output directory; defaults to `output.dir`.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Also save every result's article text.
    #[arg(long)]
    pub articles: bool,
}
