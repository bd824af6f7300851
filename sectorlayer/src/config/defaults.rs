//! Default values for every setting and `ConfigFile::default()`.

use std::path::PathBuf;

use super::settings::*;
use crate::inventory::{ColumnMap, TextEncoding};
use crate::sector::ModelKind;

// =============================================================================
// Input
// =============================================================================

pub const DEFAULT_INPUT_DIR: &str = "inputs";
pub const DEFAULT_SITES_FILE: &str = "Sites.csv";
pub const DEFAULT_CELLS_FILE: &str = "Cells.csv";

// =============================================================================
// Sector geometry
// =============================================================================

pub const DEFAULT_SEGMENTS: u32 = 20;
pub const DEFAULT_RADIUS_M: f64 = 200.0;
pub const DEFAULT_BEAMWIDTH_DEG: f64 = 60.0;

// =============================================================================
// Output
// =============================================================================

pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_SITES_LAYER: &str = "Sites_for_GE";
pub const DEFAULT_CELLS_LAYER: &str = "Cells_for_GE";
pub const DEFAULT_SECTORS_LAYER: &str = "cellFile";

/// Sorted sites written back to the output directory.
pub const SITES_NORMALIZED_FILE: &str = "Sites_mod.csv";
/// Sorted cells written back to the output directory.
pub const CELLS_NORMALIZED_FILE: &str = "Cells_mod.csv";

pub const GEOPACKAGE_EXTENSION: &str = "gpkg";
pub const KMZ_EXTENSION: &str = "kmz";

// =============================================================================
// Export and styles
// =============================================================================

pub const DEFAULT_NAME_FIELD: &str = "Site_ID";
pub const STYLES_SUBDIR: &str = "qgis_styles";
pub const DEFAULT_SITES_STYLE: &str = "style_Sites.qml";
pub const DEFAULT_CELLS_STYLE: &str = "style_Cells.qml";

// =============================================================================
// Logging
// =============================================================================

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "sectorlayer.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            input: InputSettings {
                directory: PathBuf::from(DEFAULT_INPUT_DIR),
                sites_file: DEFAULT_SITES_FILE.to_string(),
                cells_file: DEFAULT_CELLS_FILE.to_string(),
                encoding: TextEncoding::default(),
                columns: ColumnMap::default(),
            },
            sector: SectorSettings {
                segments: DEFAULT_SEGMENTS,
                radius: DEFAULT_RADIUS_M,
                beamwidth: DEFAULT_BEAMWIDTH_DEG,
                model: ModelKind::default(),
            },
            output: OutputSettings {
                directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
                overwrite: false,
                write_normalized: true,
                sites_layer: DEFAULT_SITES_LAYER.to_string(),
                cells_layer: DEFAULT_CELLS_LAYER.to_string(),
                sectors_layer: DEFAULT_SECTORS_LAYER.to_string(),
            },
            export: ExportSettings {
                site_name_field: DEFAULT_NAME_FIELD.to_string(),
                cell_name_field: DEFAULT_NAME_FIELD.to_string(),
                site_description_fields: Vec::new(),
                cell_description_fields: Vec::new(),
            },
            styles: StyleSettings {
                directory: None,
                sites_style: DEFAULT_SITES_STYLE.to_string(),
                cells_style: DEFAULT_CELLS_STYLE.to_string(),
            },
            logging: LoggingSettings {
                file: PathBuf::from(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE),
            },
        }
    }
}
