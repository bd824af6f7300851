//! Overlay archives for generic map clients.
//!
//! An [`Exporter`] turns one [`VectorLayer`] into a self-contained archive
//! with one placemark per feature. [`KmzExporter`] writes KMZ: a zip holding
//! `doc.kml` and the icon it references.

mod icon;
mod kml;
mod kmz;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::layer::VectorLayer;

pub use icon::{point_icon_png, ICON_PATH};
pub use kml::KmlDocument;
pub use kmz::KmzExporter;

/// Errors from exporting a layer.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Layer '{layer}' has no field '{field}'")]
    UnknownField { layer: String, field: String },

    #[error("Layer '{layer}' feature {feature}: invalid geometry")]
    InvalidGeometry { layer: String, feature: usize },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to render icon: {0}")]
    Icon(#[from] image::ImageError),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// What a successful export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub placemarks: usize,
}

/// Serializes a layer into an overlay archive.
///
/// `name_field` labels each placemark; `description_fields` are listed in
/// the given order in its description. Both must name fields of the layer's
/// schema. An existing file at `destination` is replaced.
pub trait Exporter: Send + Sync {
    /// Short format name for logs.
    fn format(&self) -> &'static str;

    fn export(
        &self,
        layer: &VectorLayer,
        name_field: &str,
        description_fields: &[String],
        destination: &Path,
    ) -> ExportResult<ExportSummary>;
}

/// Check that every requested field exists in the layer's schema.
pub fn validate_fields(
    layer: &VectorLayer,
    name_field: &str,
    description_fields: &[String],
) -> ExportResult<()> {
    let schema = layer.schema();
    std::iter::once(name_field)
        .chain(description_fields.iter().map(String::as_str))
        .find(|f| !schema.contains(f))
        .map_or(Ok(()), |field| {
            Err(ExportError::UnknownField {
                layer: layer.name().to_string(),
                field: field.to_string(),
            })
        })
}

/// Check that every feature geometry is finite and, for polygons, a closed
/// ring of at least four vertices.
pub fn validate_geometries(layer: &VectorLayer) -> ExportResult<()> {
    match layer.features().iter().position(|f| !f.geometry.is_valid()) {
        Some(feature) => Err(ExportError::InvalidGeometry {
            layer: layer.name().to_string(),
            feature,
        }),
        None => Ok(()),
    }
}
