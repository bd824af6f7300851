//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit codes derived from the library's error classification.

use std::fmt;
use std::path::PathBuf;
use std::process;

use sectorlayer::config::ConfigFileError;
use sectorlayer::pipeline::{ErrorKind, PipelineError};
use sectorlayer::sector::SectorError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read or holds invalid values
    Config(ConfigFileError),
    /// Config file exists and `--force` was not given
    ConfigExists(PathBuf),
    /// Run aborted before writing any output
    Pipeline(PipelineError),
    /// Some artifacts of a run could not be written
    ArtifactsFailed {
        failed: usize,
        total: usize,
        kinds: Vec<ErrorKind>,
    },
    /// Single-sector generation failed
    Sector(SectorError),
    /// Failed to serialize output
    Serialize(String),
}

impl CliError {
    /// Process exit code.
    ///
    /// 2 for invalid input, 3 for destination conflicts, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(ConfigFileError::InvalidValue { .. }) => 2,
            CliError::Sector(_) => 2,
            CliError::Pipeline(e) => kind_code(e.kind()),
            CliError::ArtifactsFailed { kinds, .. } => {
                if kinds.iter().all(|k| *k == ErrorKind::DestinationConflict) {
                    3
                } else {
                    1
                }
            }
            _ => 1,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Pipeline(e) if e.kind() == ErrorKind::InputValidation => {
                eprintln!();
                eprintln!("Check the inventory files:");
                eprintln!("  1. Column names match the [input] *_column settings");
                eprintln!("  2. Site ids are unique in the sites file");
                eprintln!("  3. Latitude, longitude and azimuth are numbers");
                eprintln!("  4. Non-UTF-8 files need encoding = latin-1");
            }
            CliError::ArtifactsFailed { kinds, .. }
                if kinds.contains(&ErrorKind::DestinationConflict) =>
            {
                eprintln!();
                eprintln!("Existing GeoPackages are never replaced by default.");
                eprintln!("Remove them or re-run with --overwrite.");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'sectorlayer config path' to locate the configuration file.");
            }
            CliError::ConfigExists(_) => {
                eprintln!();
                eprintln!("Use 'sectorlayer config init --force' to replace it.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

fn kind_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InputValidation | ErrorKind::GeometryDegeneracy => 2,
        ErrorKind::DestinationConflict => 3,
        ErrorKind::SchemaViolation | ErrorKind::Io => 1,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::ConfigExists(path) => {
                write!(f, "Configuration file already exists: {}", path.display())
            }
            CliError::Pipeline(e) => write!(f, "Run failed ({}): {}", e.kind(), e),
            CliError::ArtifactsFailed { failed, total, .. } => {
                write!(f, "{} of {} outputs could not be written", failed, total)
            }
            CliError::Sector(e) => write!(f, "Invalid sector: {}", e),
            CliError::Serialize(msg) => write!(f, "Failed to serialize output: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            CliError::Sector(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<SectorError> for CliError {
    fn from(e: SectorError) -> Self {
        CliError::Sector(e)
    }
}
