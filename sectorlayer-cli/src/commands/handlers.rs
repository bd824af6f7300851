//! Command handlers.
//!
//! Each handler implements `CommandHandler` and depends only on the trait
//! interfaces in `CommandContext`.

use serde_json::json;

use super::args::{ConfigArgs, ConfigCommands, RunArgs, SectorArgs};
use super::traits::{CommandContext, CommandHandler};
use crate::error::CliError;
use sectorlayer::pipeline::{ArtifactStatus, RunReport};
use sectorlayer::sector::{self, LatLon, ModelKind, SectorPolygon};

// ============================================================================
// Run Handler
// ============================================================================

/// Handler for the `run` command.
pub struct RunHandler;

impl CommandHandler for RunHandler {
    type Args = RunArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let mut config = ctx.config.load()?;
        args.apply(&mut config);
        let run_config = config.to_run_config()?;

        ctx.output.header("SectorLayer");
        ctx.output
            .indented(&format!("Sites:   {}", run_config.sites_path.display()));
        ctx.output
            .indented(&format!("Cells:   {}", run_config.cells_path.display()));
        ctx.output
            .indented(&format!("Outputs: {}", run_config.output_dir.display()));
        ctx.output.indented(&format!(
            "Model:   {} ({} segments)",
            run_config.model, run_config.segments
        ));
        ctx.output.newline();

        let report = ctx.pipeline.run(&run_config)?;
        print_report(ctx, &report);

        if report.is_success() {
            return Ok(());
        }

        let kinds = report
            .failures()
            .filter_map(|a| a.error())
            .map(|e| e.kind())
            .collect();
        Err(CliError::ArtifactsFailed {
            failed: report.failures().count(),
            total: report.artifacts.len(),
            kinds,
        })
    }
}

fn print_report(ctx: &CommandContext<'_>, report: &RunReport) {
    ctx.output.println(&format!(
        "Loaded {} sites, {} cells; generated {} sectors",
        report.sites, report.cells, report.sectors
    ));
    ctx.output.newline();

    ctx.output.subheader("Outputs");
    for outcome in &report.artifacts {
        let line = match &outcome.status {
            ArtifactStatus::Written(count) => format!(
                "[ok]     {:<10} {} ({} records)",
                outcome.artifact.to_string(),
                outcome.path.display(),
                count
            ),
            ArtifactStatus::Failed(e) => format!(
                "[failed] {:<10} {}: {}",
                outcome.artifact.to_string(),
                outcome.path.display(),
                e
            ),
        };
        ctx.output.indented(&line);
    }
}

// ============================================================================
// Sector Handler
// ============================================================================

/// Handler for the `sector` command.
pub struct SectorHandler;

impl CommandHandler for SectorHandler {
    type Args = SectorArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let model: ModelKind = args.model.into();
        let polygon = sector::generate(
            LatLon::new(args.lat, args.lon),
            args.azimuth,
            args.beamwidth,
            args.radius,
            args.segments,
            model,
        )?;

        let feature = sector_feature(&args, model, &polygon);
        let text =
            serde_json::to_string_pretty(&feature).map_err(|e| CliError::Serialize(e.to_string()))?;
        ctx.output.println(&text);
        Ok(())
    }
}

/// GeoJSON Feature for one sector. Positions are `[longitude, latitude]`.
fn sector_feature(args: &SectorArgs, model: ModelKind, polygon: &SectorPolygon) -> serde_json::Value {
    let ring: Vec<[f64; 2]> = polygon.ring().iter().map(|p| [p.lon, p.lat]).collect();

    json!({
        "type": "Feature",
        "properties": {
            "azimuth": args.azimuth,
            "beamwidth": args.beamwidth,
            "radius": args.radius,
            "segments": args.segments,
            "model": model.as_str(),
            "full_circle": polygon.is_full_circle(),
        },
        "geometry": {
            "type": "Polygon",
            "coordinates": [ring],
        }
    })
}

// ============================================================================
// Config Handler
// ============================================================================

/// Handler for the `config` subcommands.
pub struct ConfigHandler;

impl CommandHandler for ConfigHandler {
    type Args = ConfigArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        match args.command {
            ConfigCommands::Path => {
                ctx.output.println(&ctx.config.path().display().to_string());
            }
            ConfigCommands::Init { force } => {
                let path = ctx.config.path();
                if ctx.config.exists() && !force {
                    return Err(CliError::ConfigExists(path.to_path_buf()));
                }
                ctx.config.save(&Default::default())?;
                ctx.output.println("Wrote default configuration to:");
                ctx.output.indented(&path.display().to_string());
            }
            ConfigCommands::Show => {
                let config = ctx.config.load()?;
                let source = if ctx.config.exists() {
                    ctx.config.path().display().to_string()
                } else {
                    format!("{} (not found, showing defaults)", ctx.config.path().display())
                };
                ctx.output.println(&format!("# {}", source));
                ctx.output.print(&config.to_ini_string());
            }
        }
        Ok(())
    }
}
