use std::fmt;
use std::path::PathBuf;

use super::PipelineError;

/// Kind of file a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    NormalizedCsv,
    GeoPackage,
    Kmz,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Artifact::NormalizedCsv => "CSV",
            Artifact::GeoPackage => "GeoPackage",
            Artifact::Kmz => "KMZ",
        })
    }
}

#[derive(Debug)]
pub enum ArtifactStatus {
    /// Written with this many records or features.
    Written(usize),
    Failed(PipelineError),
}

#[derive(Debug)]
pub struct ArtifactOutcome {
    pub artifact: Artifact,
    pub path: PathBuf,
    pub status: ArtifactStatus,
}

impl ArtifactOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, ArtifactStatus::Written(_))
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match &self.status {
            ArtifactStatus::Failed(e) => Some(e),
            ArtifactStatus::Written(_) => None,
        }
    }
}

/// Result of a run that got past validation.
#[derive(Debug, Default)]
pub struct RunReport {
    pub sites: usize,
    pub cells: usize,
    pub sectors: usize,
    pub artifacts: Vec<ArtifactOutcome>,
}

impl RunReport {
    pub(super) fn record<T>(
        &mut self,
        artifact: Artifact,
        path: PathBuf,
        result: Result<T, PipelineError>,
        count: impl FnOnce(&T) -> usize,
    ) {
        let status = match result {
            Ok(value) => ArtifactStatus::Written(count(&value)),
            Err(e) => {
                tracing::error!(
                    artifact = %artifact,
                    path = %path.display(),
                    kind = %e.kind(),
                    error = %e,
                    "Artifact failed"
                );
                ArtifactStatus::Failed(e)
            }
        };
        self.artifacts.push(ArtifactOutcome {
            artifact,
            path,
            status,
        });
    }

    pub fn written(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.artifacts.iter().filter(|a| a.is_written())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.artifacts.iter().filter(|a| !a.is_written())
    }

    /// True when every artifact was written.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}
