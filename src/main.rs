use std::fs::File;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;

use skyburst::config::Config;

fn init_logging(cfg: &Config) -> Result<()> {
    // The show owns the terminal, so logs only go to a file.
    let Some(path) = &cfg.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(cfg.log_level)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cfg = Config::parse();
    init_logging(&cfg)?;
    skyburst::app::run(cfg)
}
