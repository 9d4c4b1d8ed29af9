//! File logging setup.
//!
//! Panels usually run inside a UI that owns the terminal or window, so log
//! output goes to a file instead of stdout.

use std::fs::File;
use std::path::Path;

use simplelog::{Config, LevelFilter, WriteLogger};

use crate::error::LoggingError;

/// Install a global logger writing to `path` at `level`.
///
/// ```no_run
/// panelkit::logging::init_file_logger("panel.log", log::LevelFilter::Debug)?;
/// # Ok::<(), panelkit::LoggingError>(())
/// ```
pub fn init_file_logger(path: impl AsRef<Path>, level: LevelFilter) -> Result<(), LoggingError> {
    let file = File::create(path)?;
    WriteLogger::init(level, Config::default(), file)?;
    log::info!("panel logging initialized at {}", level);
    Ok(())
}
