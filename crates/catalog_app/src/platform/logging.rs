use std::path::PathBuf;

use catalog_logging::{level_for_verbosity, LogDestination};

/// Terminal logging always; a log file as well when one is configured.
pub fn init_logging(log_file: Option<PathBuf>, verbosity: u8) {
    let destination = match log_file {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    catalog_logging::initialize(destination, level_for_verbosity(verbosity));
}
