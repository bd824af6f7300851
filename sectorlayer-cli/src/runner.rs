//! CLI runner: configuration loading and logging setup.

use std::path::Path;

use tracing::info;

use crate::error::CliError;
use sectorlayer::config::ConfigFile;
use sectorlayer::logging::{init_logging, LoggingGuard};

/// Keeps logging alive for the duration of a command.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
}

impl CliRunner {
    /// Initialize logging from the configuration at `config_path`.
    ///
    /// Log lines go to the configured file; with `debug_mode` they are also
    /// mirrored to stdout at debug level.
    pub fn new(config_path: &Path, debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load_from(config_path)?;

        let logging_guard = init_logging(&config.logging.file, debug_mode, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self { logging_guard })
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("SectorLayer v{}", sectorlayer::VERSION);
        info!(
            log = %self.logging_guard.path().display(),
            "SectorLayer CLI: {} command", command
        );
    }
}
