//! CLI commands built on the command handler pattern.
//!
//! - `traits`: interfaces handlers depend on (`Output`, `PipelineService`,
//!   `ConfigStore`, `CommandHandler`)
//! - `services`: production implementations
//! - `args`: clap-derived argument types
//! - `handlers`: one handler per command
//!
//! ```ignore
//! let output = ConsoleOutput::new();
//! let pipeline = DefaultPipelineService::new();
//! let store = FileConfigStore::new(config_file_path());
//! let ctx = CommandContext::new(&output, &pipeline, &store);
//! RunHandler::execute(args, &ctx)?;
//! ```

mod args;
mod handlers;
mod services;
mod traits;


pub use args::Commands;

use args::{ConfigArgs, RunArgs, SectorArgs};
use handlers::{ConfigHandler, RunHandler, SectorHandler};
use services::{ConsoleOutput, DefaultPipelineService, FileConfigStore};
use traits::{CommandContext, CommandHandler};

use crate::error::CliError;
use crate::runner::CliRunner;
use sectorlayer::config::config_file_path;

/// Run a top-level command with production services.
pub fn run(command: Commands) -> Result<(), CliError> {
    let output = ConsoleOutput::new();
    let pipeline = DefaultPipelineService::new();

    match command {
        Commands::Run {
            config,
            inputs,
            outputs,
            segments,
            radius,
            beamwidth,
            model,
            overwrite,
            no_normalized,
            debug,
        } => {
            let config_path = config.unwrap_or_else(config_file_path);
            let runner = CliRunner::new(&config_path, debug)?;
            runner.log_startup("run");

            let store = FileConfigStore::new(config_path);

            let ctx = CommandContext::new(&output, &pipeline, &store);
            RunHandler::execute(
                RunArgs {
                    inputs,
                    outputs,
                    segments,
                    radius,
                    beamwidth,
                    model,
                    overwrite,
                    no_normalized,
                },
                &ctx,
            )
        }

        Commands::Sector {
            lat,
            lon,
            azimuth,
            beamwidth,
            radius,
            segments,
            model,
        } => {
            let store = FileConfigStore::new(config_file_path());
            let ctx = CommandContext::new(&output, &pipeline, &store);
            SectorHandler::execute(
                SectorArgs {
                    lat,
                    lon,
                    azimuth,
                    beamwidth,
                    radius,
                    segments,
                    model,
                },
                &ctx,
            )
        }

        Commands::Config { config, command } => {
            let store = FileConfigStore::new(config.unwrap_or_else(config_file_path));
            let ctx = CommandContext::new(&output, &pipeline, &store);
            ConfigHandler::execute(ConfigArgs { command }, &ctx)
        }
    }
}
