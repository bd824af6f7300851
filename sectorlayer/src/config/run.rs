use std::path::PathBuf;

use super::defaults::{
    CELLS_NORMALIZED_FILE, GEOPACKAGE_EXTENSION, KMZ_EXTENSION, SITES_NORMALIZED_FILE,
    STYLES_SUBDIR,
};
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::inventory::{CellDefaults, InputOptions};
use crate::sector::{is_full_circle, ModelKind, FULL_CIRCLE, MIN_FULL_CIRCLE_SEGMENTS};

/// Layer names used for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerNames {
    pub sites: String,
    pub cells: String,
    pub sectors: String,
}

/// Placemark label and description fields for one export.
///
/// An empty description list means every field of the layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFields {
    pub name_field: String,
    pub description_fields: Vec<String>,
}

/// Everything a pipeline run needs, resolved and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub sites_path: PathBuf,
    pub cells_path: PathBuf,
    pub input: InputOptions,
    pub segments: u32,
    pub cell_defaults: CellDefaults,
    pub model: ModelKind,
    pub output_dir: PathBuf,
    pub overwrite: bool,
    pub write_normalized: bool,
    pub layers: LayerNames,
    pub site_export: ExportFields,
    pub cell_export: ExportFields,
    pub sites_style: Option<PathBuf>,
    pub cells_style: Option<PathBuf>,
}

impl RunConfig {
    pub fn sites_package_path(&self) -> PathBuf {
        self.output_path(&self.layers.sites, GEOPACKAGE_EXTENSION)
    }

    /// The cells package holds both the cell points and the sectors.
    pub fn cells_package_path(&self) -> PathBuf {
        self.output_path(&self.layers.cells, GEOPACKAGE_EXTENSION)
    }

    pub fn sites_kmz_path(&self) -> PathBuf {
        self.output_path(&self.layers.sites, KMZ_EXTENSION)
    }

    /// The sectors layer is exported under the cells name.
    pub fn cells_kmz_path(&self) -> PathBuf {
        self.output_path(&self.layers.cells, KMZ_EXTENSION)
    }

    pub fn sites_normalized_path(&self) -> PathBuf {
        self.output_dir.join(SITES_NORMALIZED_FILE)
    }

    pub fn cells_normalized_path(&self) -> PathBuf {
        self.output_dir.join(CELLS_NORMALIZED_FILE)
    }

    fn output_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", stem, extension))
    }
}

impl ConfigFile {
    /// Resolve paths and validate values into a [`RunConfig`].
    ///
    /// Settings may have been changed after parsing (e.g. by command-line
    /// overrides), so numeric ranges are checked again here.
    pub fn to_run_config(&self) -> Result<RunConfig, ConfigFileError> {
        let invalid = |section: &str, key: &str, value: String, reason: &str| {
            ConfigFileError::InvalidValue {
                section: section.to_string(),
                key: key.to_string(),
                value,
                reason: reason.to_string(),
            }
        };

        let sector = &self.sector;
        if sector.segments < 1 {
            return Err(invalid(
                "sector",
                "segments",
                sector.segments.to_string(),
                "must be an integer >= 1",
            ));
        }
        if !(sector.radius.is_finite() && sector.radius > 0.0) {
            return Err(invalid(
                "sector",
                "radius",
                sector.radius.to_string(),
                "must be a positive number of meters",
            ));
        }
        if !(sector.beamwidth > 0.0 && sector.beamwidth <= FULL_CIRCLE) {
            return Err(invalid(
                "sector",
                "beamwidth",
                sector.beamwidth.to_string(),
                "must be greater than 0 and at most 360 degrees",
            ));
        }
        if is_full_circle(sector.beamwidth) && sector.segments < MIN_FULL_CIRCLE_SEGMENTS {
            return Err(invalid(
                "sector",
                "segments",
                sector.segments.to_string(),
                "must be at least 3 when beamwidth is 360",
            ));
        }

        let output = &self.output;
        let names = [
            ("sites_layer", &output.sites_layer),
            ("cells_layer", &output.cells_layer),
            ("sectors_layer", &output.sectors_layer),
        ];
        for (key, name) in names {
            if name.trim().is_empty() {
                return Err(invalid("output", key, name.clone(), "must not be empty"));
            }
        }
        if output.sites_layer.eq_ignore_ascii_case(&output.cells_layer) {
            return Err(invalid(
                "output",
                "cells_layer",
                output.cells_layer.clone(),
                "must differ from sites_layer",
            ));
        }
        if output.cells_layer.eq_ignore_ascii_case(&output.sectors_layer) {
            return Err(invalid(
                "output",
                "sectors_layer",
                output.sectors_layer.clone(),
                "must differ from cells_layer",
            ));
        }

        let styles_dir = self
            .styles
            .directory
            .clone()
            .unwrap_or_else(|| self.input.directory.join(STYLES_SUBDIR));
        let style_path = |file: &str| {
            let file = file.trim();
            (!file.is_empty()).then(|| styles_dir.join(file))
        };

        Ok(RunConfig {
            sites_path: self.input.directory.join(&self.input.sites_file),
            cells_path: self.input.directory.join(&self.input.cells_file),
            input: InputOptions {
                encoding: self.input.encoding,
                columns: self.input.columns.clone(),
            },
            segments: sector.segments,
            cell_defaults: CellDefaults {
                beamwidth: sector.beamwidth,
                radius: sector.radius,
            },
            model: sector.model,
            output_dir: output.directory.clone(),
            overwrite: output.overwrite,
            write_normalized: output.write_normalized,
            layers: LayerNames {
                sites: output.sites_layer.clone(),
                cells: output.cells_layer.clone(),
                sectors: output.sectors_layer.clone(),
            },
            site_export: ExportFields {
                name_field: self.export.site_name_field.clone(),
                description_fields: self.export.site_description_fields.clone(),
            },
            cell_export: ExportFields {
                name_field: self.export.cell_name_field.clone(),
                description_fields: self.export.cell_description_fields.clone(),
            },
            sites_style: style_path(&self.styles.sites_style),
            cells_style: style_path(&self.styles.cells_style),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_run_config_paths() {
        let run = ConfigFile::default().to_run_config().unwrap();

        assert_eq!(run.sites_path, Path::new("inputs/Sites.csv"));
        assert_eq!(run.cells_path, Path::new("inputs/Cells.csv"));
        assert_eq!(run.sites_package_path(), Path::new("outputs/Sites_for_GE.gpkg"));
        assert_eq!(run.cells_package_path(), Path::new("outputs/Cells_for_GE.gpkg"));
        assert_eq!(run.sites_kmz_path(), Path::new("outputs/Sites_for_GE.kmz"));
        assert_eq!(run.cells_kmz_path(), Path::new("outputs/Cells_for_GE.kmz"));
        assert_eq!(run.cells_normalized_path(), Path::new("outputs/Cells_mod.csv"));
        assert_eq!(
            run.sites_style.as_deref(),
            Some(Path::new("inputs/qgis_styles/style_Sites.qml"))
        );
        assert_eq!(run.cell_defaults.beamwidth, 60.0);
        assert_eq!(run.cell_defaults.radius, 200.0);
        assert_eq!(run.segments, 20);
        assert!(!run.overwrite);
    }

    #[test]
    fn test_styles_follow_input_directory() {
        let mut config = ConfigFile::default();
        config.input.directory = PathBuf::from("/data/in");
        config.styles.cells_style = String::new();

        let run = config.to_run_config().unwrap();
        assert_eq!(
            run.sites_style.as_deref(),
            Some(Path::new("/data/in/qgis_styles/style_Sites.qml"))
        );
        assert!(run.cells_style.is_none());
    }

    #[test]
    fn test_overridden_values_are_checked() {
        let mut config = ConfigFile::default();
        config.sector.segments = 0;
        assert!(config.to_run_config().is_err());

        let mut config = ConfigFile::default();
        config.sector.radius = f64::NAN;
        assert!(config.to_run_config().is_err());

        let mut config = ConfigFile::default();
        config.sector.beamwidth = 400.0;
        assert!(config.to_run_config().is_err());
    }

    #[test]
    fn test_full_circle_default_needs_three_segments() {
        let mut config = ConfigFile::default();
        config.sector.beamwidth = 360.0;
        config.sector.segments = 2;
        match config.to_run_config() {
            Err(ConfigFileError::InvalidValue { key, .. }) => assert_eq!(key, "segments"),
            other => panic!("unexpected result: {:?}", other),
        }

        config.sector.segments = 3;
        assert!(config.to_run_config().is_ok());

        // A two-segment wedge is fine when it is not a full circle
        config.sector.beamwidth = 120.0;
        config.sector.segments = 2;
        assert!(config.to_run_config().is_ok());
    }

    #[test]
    fn test_layer_names_must_differ() {
        let mut config = ConfigFile::default();
        config.output.sectors_layer = "cells_for_ge".to_string();
        assert!(matches!(
            config.to_run_config(),
            Err(ConfigFileError::InvalidValue { ref key, .. }) if key == "sectors_layer"
        ));
    }
}
