use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::crate_name;

use crate::config::LogLevel;

/// Sends `log` output to `eyedrop.log` in the XDG state dir. The terminal belongs
/// to the picker UI, so nothing is logged to stderr. `RUST_LOG` wins over `level`.
pub fn init(level: LogLevel) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(crate_name!())
        .with_context(|| "Failed to load XDG dirs.")?;
    let log_file = xdg_dirs
        .place_state_file(format!("{}.log", crate_name!()))
        .with_context(|| "Failed to create log directory")?;

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("Failed to open log file: {log_file:#?}"))?,
    );

    let mut builder = env_logger::Builder::new();
    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(level.into());
    }
    builder
        .target(env_logger::Target::Pipe(target))
        .try_init()
        .with_context(|| "Failed to initialise logging")?;

    Ok(log_file)
}
