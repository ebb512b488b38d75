//! Logging setup for the cleaner binary.
//!
//! Logs go to `./cleaner.log` unless `--log-file` names another path, keeping
//! the terminal free for status output.

use std::path::{Path, PathBuf};

use engine_logging::LogDestination;
use log::LevelFilter;

const DEFAULT_LOG_FILE: &str = "cleaner.log";

pub fn initialize(log_file: Option<&Path>, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let path = log_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    if !engine_logging::initialize(LogDestination::File(path), level) {
        eprintln!("Warning: a logger was already installed");
    }
}
