//! Argument types and CLI definitions.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use sectorlayer::config::{ConfigFile, DEFAULT_BEAMWIDTH_DEG, DEFAULT_RADIUS_M, DEFAULT_SEGMENTS};
use sectorlayer::sector::ModelKind;

/// Destination model argument for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelArg {
    /// Ellipsoidal WGS84 geodesic (most accurate)
    Geodesic,
    /// Great circle on a sphere of mean Earth radius
    Spherical,
    /// Flat-earth degree offsets (legacy behaviour)
    Planar,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Geodesic => ModelKind::Geodesic,
            ModelArg::Spherical => ModelKind::Spherical,
            ModelArg::Planar => ModelKind::Planar,
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Convert the site and cell inventory into GeoPackages and KMZ files
    Run {
        /// Configuration file (default: ~/.sectorlayer/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding the sites and cells CSV files
        #[arg(long)]
        inputs: Option<PathBuf>,

        /// Directory receiving the generated files
        #[arg(long)]
        outputs: Option<PathBuf>,

        /// Arc subdivisions per sector
        #[arg(long)]
        segments: Option<u32>,

        /// Radius in meters for cells without one
        #[arg(long)]
        radius: Option<f64>,

        /// Beamwidth in degrees for cells without one
        #[arg(long)]
        beamwidth: Option<f64>,

        /// Destination model used to place arc vertices
        #[arg(long, value_enum)]
        model: Option<ModelArg>,

        /// Replace existing GeoPackages
        #[arg(long)]
        overwrite: bool,

        /// Skip writing the sorted *_mod.csv files
        #[arg(long)]
        no_normalized: bool,

        /// Mirror debug-level logs to the console
        #[arg(long)]
        debug: bool,
    },

    /// Print a single sector polygon as GeoJSON
    Sector {
        /// Latitude of the antenna in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude of the antenna in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Central bearing in degrees clockwise from north
        #[arg(long, allow_hyphen_values = true)]
        azimuth: f64,

        /// Angular width in degrees (360 for a full circle)
        #[arg(long, default_value_t = DEFAULT_BEAMWIDTH_DEG)]
        beamwidth: f64,

        /// Radius in meters
        #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: f64,

        /// Arc subdivisions
        #[arg(long, default_value_t = DEFAULT_SEGMENTS)]
        segments: u32,

        /// Destination model
        #[arg(long, value_enum, default_value = "geodesic")]
        model: ModelArg,
    },

    /// Inspect or create the configuration file
    Config {
        /// Configuration file (default: ~/.sectorlayer/config.ini)
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

// ============================================================================
// Handler Arguments
// ============================================================================

/// Arguments for the run handler. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub inputs: Option<PathBuf>,
    pub outputs: Option<PathBuf>,
    pub segments: Option<u32>,
    pub radius: Option<f64>,
    pub beamwidth: Option<f64>,
    pub model: Option<ModelArg>,
    pub overwrite: bool,
    pub no_normalized: bool,
}

impl RunArgs {
    /// Layer command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut ConfigFile) {
        if let Some(dir) = &self.inputs {
            config.input.directory = dir.clone();
        }
        if let Some(dir) = &self.outputs {
            config.output.directory = dir.clone();
        }
        if let Some(segments) = self.segments {
            config.sector.segments = segments;
        }
        if let Some(radius) = self.radius {
            config.sector.radius = radius;
        }
        if let Some(beamwidth) = self.beamwidth {
            config.sector.beamwidth = beamwidth;
        }
        if let Some(model) = self.model {
            config.sector.model = model.into();
        }
        if self.overwrite {
            config.output.overwrite = true;
        }
        if self.no_normalized {
            config.output.write_normalized = false;
        }
    }
}

/// Arguments for the sector handler.
#[derive(Debug, Clone)]
pub struct SectorArgs {
    pub lat: f64,
    pub lon: f64,
    pub azimuth: f64,
    pub beamwidth: f64,
    pub radius: f64,
    pub segments: u32,
    pub model: ModelArg,
}

/// Arguments for the config handler.
#[derive(Debug, Clone, Copy)]
pub struct ConfigArgs {
    pub command: ConfigCommands,
}
