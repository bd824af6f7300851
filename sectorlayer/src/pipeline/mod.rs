//! Sequential batch run from inventory files to output artifacts.
//!
//! ```text
//! read inventory ─► generate sectors ─► assemble layers ─► check export fields
//!                                                               │
//!            ┌──────────────────────────────────────────────────┘
//!            ▼
//!   normalized CSVs ─► GeoPackages ─► KMZ archives
//! ```
//!
//! Everything up to the export field check happens in memory; any failure
//! there aborts the run before a single file is written. In the writing
//! phase each artifact succeeds or fails on its own and the outcome is
//! recorded in the [`RunReport`].

mod report;
mod runner;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::export::ExportError;
use crate::inventory::InputError;
use crate::layer::LayerError;
use crate::package::PackageError;
use crate::sector::SectorError;

pub use report::{Artifact, ArtifactOutcome, ArtifactStatus, RunReport};
pub use runner::{load_style, resolve_description_fields, Pipeline};

/// Classification of failures, used for exit codes and hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input files or out-of-range parameters
    InputValidation,
    /// Feature attributes not matching the layer schema
    SchemaViolation,
    /// Output already exists and overwrite is disabled
    DestinationConflict,
    /// Geometry that cannot be computed or stored
    GeometryDegeneracy,
    /// Filesystem or storage failure
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::InputValidation => "input validation",
            ErrorKind::SchemaViolation => "schema violation",
            ErrorKind::DestinationConflict => "destination conflict",
            ErrorKind::GeometryDegeneracy => "geometry degeneracy",
            ErrorKind::Io => "i/o",
        })
    }
}

/// Any failure of a pipeline run or one of its artifacts.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Sector(#[from] SectorError),

    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Input(InputError::ReadFailed { .. })
            | PipelineError::Input(InputError::WriteFailed { .. }) => ErrorKind::Io,
            PipelineError::Input(_) => ErrorKind::InputValidation,
            PipelineError::Sector(e) => sector_kind(e),
            PipelineError::Layer(_) => ErrorKind::SchemaViolation,
            PipelineError::Package(PackageError::DestinationExists(_)) => {
                ErrorKind::DestinationConflict
            }
            PipelineError::Package(PackageError::InvalidGeometry { .. })
            | PipelineError::Package(PackageError::CorruptGeometry { .. }) => {
                ErrorKind::GeometryDegeneracy
            }
            PipelineError::Package(PackageError::Layer(_)) => ErrorKind::SchemaViolation,
            PipelineError::Package(PackageError::DuplicateLayer(_))
            | PipelineError::Package(PackageError::ReservedField { .. })
            | PipelineError::Package(PackageError::StyleEncoding { .. }) => {
                ErrorKind::InputValidation
            }
            PipelineError::Package(_) => ErrorKind::Io,
            PipelineError::Export(ExportError::UnknownField { .. }) => ErrorKind::InputValidation,
            PipelineError::Export(ExportError::InvalidGeometry { .. }) => {
                ErrorKind::GeometryDegeneracy
            }
            PipelineError::Export(_) => ErrorKind::Io,
            PipelineError::OutputDirectory { .. } => ErrorKind::Io,
        }
    }
}

fn sector_kind(error: &SectorError) -> ErrorKind {
    match error {
        SectorError::InvalidParameter { .. } => ErrorKind::InputValidation,
        SectorError::DegenerateOrigin { .. } => ErrorKind::GeometryDegeneracy,
        SectorError::Cell { source, .. } => sector_kind(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let conflict = PipelineError::from(PackageError::DestinationExists("x.gpkg".into()));
        assert_eq!(conflict.kind(), ErrorKind::DestinationConflict);

        let unknown = PipelineError::from(ExportError::UnknownField {
            layer: "cellFile".into(),
            field: "Band".into(),
        });
        assert_eq!(unknown.kind(), ErrorKind::InputValidation);

        let polar = PipelineError::from(SectorError::Cell {
            index: 3,
            site_id: "S9".into(),
            source: Box::new(SectorError::DegenerateOrigin { lat: 90.0, lon: 0.0 }),
        });
        assert_eq!(polar.kind(), ErrorKind::GeometryDegeneracy);

        let schema = PipelineError::from(LayerError::EmptyName);
        assert_eq!(schema.kind(), ErrorKind::SchemaViolation);
    }
}
