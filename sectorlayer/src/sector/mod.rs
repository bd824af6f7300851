//! Sector geometry generation
//!
//! Turns an antenna position, azimuth, beamwidth and radius into a closed
//! polygon approximating its coverage wedge ("pie"). Distances are real
//! meters over the curved Earth; the formula is chosen through a
//! [`DestinationModel`].
//!
//! # Vertex order
//!
//! A wedge ring is `[apex, arc_0, .., arc_segments, apex]`, so it always has
//! `segments + 3` vertices and its first vertex is the apex. A 360° beamwidth
//! yields a full ring of `segments + 1` vertices without an apex.
//!
//! ```
//! use sectorlayer::sector::{generate, LatLon, ModelKind};
//!
//! let wedge = generate(LatLon::new(40.0, -3.0), 90.0, 60.0, 200.0, 4, ModelKind::Geodesic)?;
//! assert_eq!(wedge.len(), 7);
//! assert_eq!(wedge.apex(), Some(LatLon::new(40.0, -3.0)));
//! # Ok::<(), sectorlayer::sector::SectorError>(())
//! ```

mod destination;
mod generator;
mod types;


pub use destination::{
    normalize_bearing, normalize_longitude, DestinationModel, GeodesicModel, ModelKind,
    PlanarModel, SphericalModel, MEAN_EARTH_RADIUS,
};
pub use generator::{generate_all, FanGenerator, SectorGenerator};
pub use types::{
    is_full_circle, LatLon, SectorError, SectorPolygon, SectorRequest, FULL_CIRCLE, MAX_LAT,
    MAX_LON, MIN_FULL_CIRCLE_SEGMENTS, MIN_LAT, MIN_LON,
};

/// Generate a single sector polygon with the given destination model.
pub fn generate(
    origin: LatLon,
    azimuth: f64,
    beamwidth: f64,
    radius: f64,
    segments: u32,
    model: ModelKind,
) -> Result<SectorPolygon, SectorError> {
    let request = SectorRequest::new(origin, azimuth, beamwidth, radius, segments);
    FanGenerator::with_kind(model).generate(&request)
}
