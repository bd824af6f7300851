//! Concrete implementations of the service traits.

use std::path::{Path, PathBuf};

use super::traits::{ConfigStore, Output, PipelineService};
use crate::error::CliError;
use sectorlayer::config::{ConfigFile, RunConfig};
use sectorlayer::pipeline::{Pipeline, PipelineError, RunReport};

// ============================================================================
// Console Output Implementation
// ============================================================================

/// Standard console output implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    /// Create a new console output.
    pub fn new() -> Self {
        Self
    }
}

impl Output for ConsoleOutput {
    fn println(&self, message: &str) {
        println!("{}", message);
    }

    fn print(&self, message: &str) {
        print!("{}", message);
    }
}

// ============================================================================
// Default Pipeline Service
// ============================================================================

/// Runs the library pipeline with the generator and exporter the
/// configuration selects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPipelineService;

impl DefaultPipelineService {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineService for DefaultPipelineService {
    fn run(&self, config: &RunConfig) -> Result<RunReport, PipelineError> {
        Pipeline::for_config(config).run(config)
    }
}

// ============================================================================
// File Config Store
// ============================================================================

/// INI file on disk.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ConfigStore for FileConfigStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<ConfigFile, CliError> {
        Ok(ConfigFile::load_from(&self.path)?)
    }

    fn save(&self, config: &ConfigFile) -> Result<(), CliError> {
        Ok(config.save_to(&self.path)?)
    }
}
