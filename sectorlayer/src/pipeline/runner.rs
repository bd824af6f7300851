use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::report::{Artifact, RunReport};
use super::PipelineError;
use crate::config::{ExportFields, RunConfig};
use crate::export::{validate_fields, Exporter, KmzExporter};
use crate::inventory::{encode_normalized, Inventory};
use crate::layer::{cells_layer, sectors_layer, sites_layer, Style, VectorLayer};
use crate::package::{package, validate_layers, PackageOptions};
use crate::sector::{generate_all, FanGenerator, SectorGenerator, SectorRequest};

/// Runs the full inventory-to-artifacts batch.
///
/// The sector generator and exporter are swappable; [`Pipeline::for_config`]
/// wires the defaults.
pub struct Pipeline {
    generator: Box<dyn SectorGenerator>,
    exporter: Box<dyn Exporter>,
}

impl Pipeline {
    pub fn new(generator: Box<dyn SectorGenerator>, exporter: Box<dyn Exporter>) -> Self {
        Self {
            generator,
            exporter,
        }
    }

    /// Fan generator with the configured distance model and KMZ export.
    pub fn for_config(config: &RunConfig) -> Self {
        Self::new(
            Box::new(FanGenerator::with_kind(config.model)),
            Box::new(KmzExporter::new()),
        )
    }

    /// Run every stage in order.
    ///
    /// # Errors
    ///
    /// Validation failures (bad input, bad sector parameters, unknown export
    /// fields, layers a package cannot hold) are returned before anything
    /// is written. Failures of individual artifacts are recorded in the
    /// report instead.
    pub fn run(&self, config: &RunConfig) -> Result<RunReport, PipelineError> {
        // Read and validate
        info!(
            sites = %config.sites_path.display(),
            cells = %config.cells_path.display(),
            "Reading inventory"
        );
        let inventory = Inventory::load(
            &config.sites_path,
            &config.cells_path,
            &config.input,
            &config.cell_defaults,
        )?;
        info!(
            sites = inventory.sites.len(),
            cells = inventory.cells.len(),
            "Inventory loaded"
        );

        // Generate
        let polygons = generate_all(self.generator.as_ref(), &inventory.cells.records, |cell| {
            (
                SectorRequest::new(
                    cell.position,
                    cell.azimuth,
                    cell.beamwidth,
                    cell.radius,
                    config.segments,
                ),
                cell.site_id.as_str(),
            )
        })?;
        info!(sectors = polygons.len(), segments = config.segments, "Sectors generated");

        // Assemble
        let sites = sites_layer(
            &config.layers.sites,
            &inventory.sites,
            load_style(config.sites_style.as_deref()),
        )?;
        let cells = cells_layer(&config.layers.cells, &inventory.cells, None)?;
        let sectors = sectors_layer(
            &config.layers.sectors,
            &inventory.cells,
            polygons,
            load_style(config.cells_style.as_deref()),
        )?;

        let site_fields = resolve_description_fields(&sites, &config.site_export);
        let cell_fields = resolve_description_fields(&sectors, &config.cell_export);
        validate_fields(&sites, &config.site_export.name_field, &site_fields)?;
        validate_fields(&sectors, &config.cell_export.name_field, &cell_fields)?;

        let packages: [(PathBuf, Vec<VectorLayer>); 2] = [
            (config.sites_package_path(), vec![sites.clone()]),
            (config.cells_package_path(), vec![cells, sectors.clone()]),
        ];
        for (_, layers) in &packages {
            validate_layers(layers)?;
        }

        let normalized = if config.write_normalized {
            let encoding = config.input.encoding;
            let sites_path = config.sites_normalized_path();
            let cells_path = config.cells_normalized_path();
            let sites_csv = encode_normalized(&sites_path, &inventory.sites, encoding)?;
            let cells_csv = encode_normalized(&cells_path, &inventory.cells, encoding)?;
            vec![
                (sites_path, sites_csv, inventory.sites.len()),
                (cells_path, cells_csv, inventory.cells.len()),
            ]
        } else {
            Vec::new()
        };

        // Write
        fs::create_dir_all(&config.output_dir).map_err(|e| PipelineError::OutputDirectory {
            path: config.output_dir.clone(),
            source: e,
        })?;

        let mut report = RunReport {
            sites: sites.len(),
            cells: inventory.cells.len(),
            sectors: sectors.len(),
            artifacts: Vec::new(),
        };

        for (path, bytes, rows) in normalized {
            let result = fs::write(&path, bytes).map_err(|e| {
                PipelineError::from(crate::inventory::InputError::WriteFailed {
                    path: path.clone(),
                    source: e,
                })
            });
            if result.is_ok() {
                info!(path = %path.display(), rows, "Wrote normalized table");
            }
            report.record(Artifact::NormalizedCsv, path, result, |_| rows);
        }

        let options = PackageOptions {
            overwrite: config.overwrite,
        };
        for (path, layers) in packages {
            let result = package(&layers, &path, &options).map_err(PipelineError::from);
            report.record(Artifact::GeoPackage, path, result, |summary| {
                summary.layers.iter().map(|(_, n)| n).sum()
            });
        }

        let exports = [
            (config.sites_kmz_path(), &sites, &config.site_export.name_field, &site_fields),
            (config.cells_kmz_path(), &sectors, &config.cell_export.name_field, &cell_fields),
        ];
        for (path, layer, name_field, fields) in exports {
            debug!(format = self.exporter.format(), layer = layer.name(), "Exporting");
            let result = self
                .exporter
                .export(layer, name_field, fields, &path)
                .map_err(PipelineError::from);
            report.record(Artifact::Kmz, path, result, |summary| summary.placemarks);
        }

        let failed = report.failures().count();
        if failed == 0 {
            info!(artifacts = report.artifacts.len(), "Run complete");
        } else {
            warn!(
                artifacts = report.artifacts.len(),
                failed, "Run complete with failures"
            );
        }
        Ok(report)
    }
}

/// Description fields for an export; an empty list means every schema field.
pub fn resolve_description_fields(layer: &VectorLayer, fields: &ExportFields) -> Vec<String> {
    if fields.description_fields.is_empty() {
        layer.schema().names().map(String::from).collect()
    } else {
        fields.description_fields.clone()
    }
}

/// Read a style document. A missing or unreadable file leaves the layer
/// unstyled.
pub fn load_style(path: Option<&Path>) -> Option<Style> {
    let path = path?;
    match fs::read(path) {
        Ok(body) => {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            debug!(path = %path.display(), bytes = body.len(), "Loaded style");
            Some(Style::new(name, body))
        }
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            warn!(path = %path.display(), "Style file not found, layer left unstyled");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read style, layer left unstyled");
            None
        }
    }
}
