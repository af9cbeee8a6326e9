//! Diagnostic logging setup

use crate::error::{Error, Result};
use log::LevelFilter;
use std::path::Path;

/// Install a `fern` logger writing timestamped records to stderr, and to
/// `log_file` when given
///
/// Fails if a logger is already installed or the file cannot be opened.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut dispatcher = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}:{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.line().map(|v| v.to_string()).unwrap_or_default(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(log_file) = log_file {
        dispatcher = dispatcher.chain(fern::log_file(log_file)?);
    }
    dispatcher
        .apply()
        .map_err(|e| Error::Generic(format!("Failed to install logger: {}", e)))?;
    log::debug!("Logging level {} enabled", level);
    Ok(())
}
