use std::path::PathBuf;

use clap::Parser;

/// Write the fixed `(x, y)` dataset into an SQLite file, replacing the
/// target relation.
#[derive(Debug, Parser)]
#[command(name = "make_data")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML file overriding the output `path` and `table`
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Append log lines to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
