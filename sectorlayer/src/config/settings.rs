//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;

use crate::inventory::{ColumnMap, TextEncoding};
use crate::sector::ModelKind;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub input: InputSettings,
    pub sector: SectorSettings,
    pub output: OutputSettings,
    pub export: ExportSettings,
    pub styles: StyleSettings,
    pub logging: LoggingSettings,
}

/// Where the inventory files are and how to read them.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSettings {
    pub directory: PathBuf,
    pub sites_file: String,
    pub cells_file: String,
    pub encoding: TextEncoding,
    pub columns: ColumnMap,
}

/// Default wedge parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorSettings {
    /// Arc subdivisions per wedge
    pub segments: u32,
    /// Meters, used when a cell has no radius of its own
    pub radius: f64,
    /// Degrees, used when a cell has no beamwidth of its own
    pub beamwidth: f64,
    pub model: ModelKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub directory: PathBuf,
    /// Replace existing GeoPackages
    pub overwrite: bool,
    /// Write the sorted inventory back as CSV
    pub write_normalized: bool,
    pub sites_layer: String,
    pub cells_layer: String,
    pub sectors_layer: String,
}

/// Placemark labelling. Empty description lists mean every field.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub site_name_field: String,
    pub cell_name_field: String,
    pub site_description_fields: Vec<String>,
    pub cell_description_fields: Vec<String>,
}

/// QGIS style documents attached to the packaged layers.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSettings {
    /// Defaults to `<input directory>/qgis_styles` when unset
    pub directory: Option<PathBuf>,
    pub sites_style: String,
    pub cells_style: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}
