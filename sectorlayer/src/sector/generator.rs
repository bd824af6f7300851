//! Fan-based sector generator.

use rayon::prelude::*;
use tracing::debug;

use super::destination::{normalize_bearing, normalize_longitude, DestinationModel, ModelKind};
use super::types::{LatLon, SectorError, SectorPolygon, SectorRequest};

/// Converts a sector request into a closed coverage polygon.
pub trait SectorGenerator: Send + Sync {
    fn generate(&self, request: &SectorRequest) -> Result<SectorPolygon, SectorError>;
}

/// Builds the wedge as a fan of equal angular steps from the apex.
///
/// Arc samples span `[azimuth - beamwidth/2, azimuth + beamwidth/2]`
/// clockwise, so the sweep always passes through the forward bearing.
pub struct FanGenerator {
    model: Box<dyn DestinationModel>,
}

impl FanGenerator {
    pub fn new(model: Box<dyn DestinationModel>) -> Self {
        Self { model }
    }

    pub fn with_kind(kind: ModelKind) -> Self {
        Self::new(kind.model())
    }

    /// Name of the destination model in use.
    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    fn arc(&self, origin: LatLon, start: f64, step: f64, samples: u32, radius: f64) -> Vec<LatLon> {
        (0..samples)
            .map(|i| {
                let bearing = normalize_bearing(start + step * i as f64);
                self.model.destination(origin, bearing, radius)
            })
            .collect()
    }
}

impl Default for FanGenerator {
    fn default() -> Self {
        Self::with_kind(ModelKind::default())
    }
}

impl SectorGenerator for FanGenerator {
    fn generate(&self, request: &SectorRequest) -> Result<SectorPolygon, SectorError> {
        request.validate()?;

        let origin = LatLon::new(request.origin.lat, normalize_longitude(request.origin.lon));
        let azimuth = normalize_bearing(request.azimuth);
        let step = request.beamwidth / request.segments as f64;

        if request.is_full_circle() {
            // Last sample would repeat the first; SectorPolygon::circle closes the ring
            let arc = self.arc(
                origin,
                azimuth - 180.0,
                step,
                request.segments,
                request.radius,
            );
            return Ok(SectorPolygon::circle(arc));
        }

        let start = azimuth - request.beamwidth / 2.0;
        let arc = self.arc(origin, start, step, request.segments + 1, request.radius);
        Ok(SectorPolygon::wedge(origin, arc))
    }
}

/// Generate one polygon per item in parallel, preserving input order.
///
/// `request_of` extracts the request and an identifier used in error context.
/// Any failing item aborts the whole batch.
pub fn generate_all<T, F>(
    generator: &dyn SectorGenerator,
    items: &[T],
    request_of: F,
) -> Result<Vec<SectorPolygon>, SectorError>
where
    T: Sync,
    F: Fn(&T) -> (SectorRequest, &str) + Sync,
{
    let polygons = items
        .par_iter()
        .enumerate()
        .map(|(index, item)| {
            let (request, id) = request_of(item);
            generator
                .generate(&request)
                .map_err(|e| SectorError::Cell {
                    index,
                    site_id: id.to_string(),
                    source: Box::new(e),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = polygons.len(), "Generated sector polygons");
    Ok(polygons)
}
