mod cli;
mod config;
mod dataset;
mod db;
mod logger;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::Cli,
    config::Config,
    db::{DBBehavior, Sqlite},
    logger::{debug, error, has_file_sink, info, init, trace, warn},
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_path) = &cli.log_file {
        if let Err(err) = init(log_path) {
            warn(&format!("cannot open log file {}: {}", log_path.display(), err));
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error(&format!("fatal error: {:?}", err));
            if has_file_sink() {
                eprintln!("Error: {:?}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let path = config.db_path()?;

    let records = dataset::generate();
    for r in &records {
        trace(&format!("record x={} y={}", r.x, r.y));
    }
    let table = dataset::assemble(records);

    let written = Sqlite::persist(&path, &config.table, &table)?;
    debug(&format!("persisted {} rows", written));

    let stored = Sqlite::fetch_table(&path, &config.table)?;
    info(&format!(
        "wrote {} rows to `{}` in {}",
        stored.len(),
        config.table,
        path.display()
    ));
    Ok(())
}
