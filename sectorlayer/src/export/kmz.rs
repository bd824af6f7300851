use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::icon::{point_icon_png, ICON_PATH};
use super::kml::KmlDocument;
use super::{
    validate_fields, validate_geometries, ExportError, ExportResult, ExportSummary, Exporter,
};
use crate::layer::{GeometryKind, VectorLayer};

/// Name of the KML document inside the archive.
pub const DOC_PATH: &str = "doc.kml";

/// Writes layers as KMZ archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmzExporter;

impl KmzExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for KmzExporter {
    fn format(&self) -> &'static str {
        "kmz"
    }

    fn export(
        &self,
        layer: &VectorLayer,
        name_field: &str,
        description_fields: &[String],
        destination: &Path,
    ) -> ExportResult<ExportSummary> {
        validate_fields(layer, name_field, description_fields)?;
        validate_geometries(layer)?;

        let kml = KmlDocument {
            layer,
            name_field,
            description_fields,
        }
        .to_string();
        let icon = match layer.kind() {
            GeometryKind::Point => Some(point_icon_png()?),
            GeometryKind::Polygon => None,
        };

        let io_err = |path: &Path, source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let zip_err = |source| ExportError::Archive {
            path: destination.to_path_buf(),
            source,
        };

        let dir = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

        let temp = tempfile::Builder::new()
            .prefix(".sectorlayer-")
            .suffix(".kmz.tmp")
            .tempfile_in(&dir)
            .map_err(|e| io_err(&dir, e))?;

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(temp.as_file());
        zip.start_file(DOC_PATH, options).map_err(zip_err)?;
        zip.write_all(kml.as_bytes())
            .map_err(|e| io_err(temp.path(), e))?;
        if let Some(png) = icon {
            // PNG data is already compressed.
            zip.start_file(
                ICON_PATH,
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            )
            .map_err(zip_err)?;
            zip.write_all(&png).map_err(|e| io_err(temp.path(), e))?;
        }
        zip.finish().map_err(zip_err)?;

        temp.persist(destination)
            .map_err(|e| io_err(destination, e.error))?;

        debug!(bytes = kml.len(), "KML document rendered");
        info!(
            layer = layer.name(),
            path = %destination.display(),
            placemarks = layer.len(),
            "KMZ written"
        );

        Ok(ExportSummary {
            path: destination.to_path_buf(),
            placemarks: layer.len(),
        })
    }
}
