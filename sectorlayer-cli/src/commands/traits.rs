//! Core traits for the command handler pattern.
//!
//! Handlers depend on these interfaces rather than on the filesystem or the
//! pipeline directly, so they can be tested with mocks.

use std::path::Path;

use crate::error::CliError;
use sectorlayer::config::{ConfigFile, RunConfig};
use sectorlayer::pipeline::{PipelineError, RunReport};

// ============================================================================
// Output Trait - Abstracts console output
// ============================================================================

/// Trait for outputting messages to the user.
pub trait Output: Send + Sync {
    /// Print a line of text.
    fn println(&self, message: &str);

    /// Print text without a newline.
    fn print(&self, message: &str);

    /// Print an empty line.
    fn newline(&self) {
        self.println("");
    }

    /// Print a section header.
    fn header(&self, title: &str) {
        self.println(title);
        self.println(&"=".repeat(title.len()));
    }

    /// Print a sub-section header.
    fn subheader(&self, title: &str) {
        self.println(title);
        self.println(&"-".repeat(title.len()));
    }

    /// Print an indented line.
    fn indented(&self, message: &str) {
        self.println(&format!("  {}", message));
    }
}

// ============================================================================
// Pipeline Service Trait
// ============================================================================

/// Runs the inventory-to-layers conversion.
pub trait PipelineService: Send + Sync {
    fn run(&self, config: &RunConfig) -> Result<RunReport, PipelineError>;
}

// ============================================================================
// Config Store Trait
// ============================================================================

/// Access to the configuration file.
pub trait ConfigStore: Send + Sync {
    /// Location of the backing file.
    fn path(&self) -> &Path;

    /// Whether the file exists yet.
    fn exists(&self) -> bool;

    /// Load the configuration, falling back to defaults when absent.
    fn load(&self) -> Result<ConfigFile, CliError>;

    fn save(&self, config: &ConfigFile) -> Result<(), CliError>;
}

// ============================================================================
// Command Context - Bundles dependencies for handlers
// ============================================================================

/// Context providing dependencies to command handlers.
pub struct CommandContext<'a> {
    /// Output interface for user messages.
    pub output: &'a dyn Output,

    /// Conversion pipeline.
    pub pipeline: &'a dyn PipelineService,

    /// Configuration file access.
    pub config: &'a dyn ConfigStore,
}

impl<'a> CommandContext<'a> {
    /// Create a new command context.
    pub fn new(
        output: &'a dyn Output,
        pipeline: &'a dyn PipelineService,
        config: &'a dyn ConfigStore,
    ) -> Self {
        Self {
            output,
            pipeline,
            config,
        }
    }
}

// ============================================================================
// Command Handler Trait
// ============================================================================

/// Trait for command handlers.
pub trait CommandHandler {
    /// The arguments type for this handler.
    type Args;

    /// Execute the command with the given arguments and context.
    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError>;
}
