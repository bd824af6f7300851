//! GeoPackage output.
//!
//! [`package`] writes an ordered set of [`VectorLayer`]s into a single
//! GeoPackage (SQLite) file; [`read_package`] loads them back.
//!
//! # Layout
//!
//! - `gpkg_spatial_ref_sys`: EPSG:4326 plus the two undefined systems
//! - `gpkg_contents` / `gpkg_geometry_columns`: one row per layer
//! - one feature table per layer (`fid`, `geom`, then the schema fields)
//! - `layer_styles`: QGIS style documents, marked as default for their layer
//!
//! The file is built under a temporary name next to the destination and
//! renamed into place only after every layer has been written, so a failed
//! run never leaves a partial package behind.

mod geometry;
mod reader;
mod writer;

use std::path::PathBuf;

use thiserror::Error;

use crate::layer::LayerError;

pub use reader::read_package;
pub use writer::{package, validate_layers, PackageOptions, PackageSummary};

/// Spatial reference of every geometry written (WGS 84).
pub const WGS84_SRS_ID: i32 = 4326;

/// Column holding the geometry blob in feature tables.
pub const GEOMETRY_COLUMN: &str = "geom";

/// Primary key column of feature tables.
pub const FID_COLUMN: &str = "fid";

/// Errors from writing or reading a GeoPackage.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("No layers to package")]
    NoLayers,

    #[error("Layer name '{0}' is used more than once")]
    DuplicateLayer(String),

    #[error("Layer '{layer}': field name '{field}' is reserved")]
    ReservedField { layer: String, field: String },

    #[error("Layer '{layer}' feature {feature}: invalid geometry")]
    InvalidGeometry { layer: String, feature: usize },

    #[error("Layer '{layer}': style '{style}' is not valid UTF-8")]
    StyleEncoding { layer: String, style: String },

    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error in {path}: {source}")]
    Sqlite {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Layer '{layer}' feature {feature}: unreadable geometry: {reason}")]
    CorruptGeometry {
        layer: String,
        feature: usize,
        reason: String,
    },

    #[error("Layer '{layer}': unsupported geometry type '{geometry_type}'")]
    UnsupportedGeometryType { layer: String, geometry_type: String },

    #[error("Layer '{layer}' column '{column}': unsupported value type")]
    UnsupportedValue { layer: String, column: String },

    #[error(transparent)]
    Layer(#[from] LayerError),
}

pub type PackageResult<T> = Result<T, PackageError>;

/// Quote an SQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests;
