//! Destination formulas: the point reached from an origin along a bearing.
//!
//! Three models sit behind [`DestinationModel`]:
//!
//! - [`GeodesicModel`] - WGS84 ellipsoid (Karney), accurate at any range
//! - [`SphericalModel`] - great circle on the mean Earth radius
//! - [`PlanarModel`] - local equirectangular approximation for short radii
//!
//! All models take bearings in degrees clockwise from true north and return
//! longitudes normalized into [-180, 180).

use std::fmt;
use std::str::FromStr;

use geo::{Destination, Geodesic, Haversine, Point};

use super::types::{LatLon, MAX_LAT, MIN_LAT};

/// Mean Earth radius in meters (IUGG).
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// Computes the point at a distance and bearing from an origin.
pub trait DestinationModel: Send + Sync {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Point `distance` meters from `origin` along `bearing` degrees.
    fn destination(&self, origin: LatLon, bearing: f64, distance: f64) -> LatLon;
}

/// Ellipsoidal geodesic on WGS84.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicModel;

impl DestinationModel for GeodesicModel {
    fn name(&self) -> &'static str {
        "geodesic"
    }

    fn destination(&self, origin: LatLon, bearing: f64, distance: f64) -> LatLon {
        let p = Geodesic::destination(Point::from(origin), bearing, distance);
        LatLon::new(p.y(), normalize_longitude(p.x()))
    }
}

/// Great-circle destination on a sphere of [`MEAN_EARTH_RADIUS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalModel;

impl DestinationModel for SphericalModel {
    fn name(&self) -> &'static str {
        "spherical"
    }

    fn destination(&self, origin: LatLon, bearing: f64, distance: f64) -> LatLon {
        let p = Haversine::destination(Point::from(origin), bearing, distance);
        LatLon::new(p.y(), normalize_longitude(p.x()))
    }
}

/// Flat-earth offset scaled by the cosine of the origin latitude.
///
/// Error grows with distance and latitude; keep radii to a few kilometers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarModel;

impl DestinationModel for PlanarModel {
    fn name(&self) -> &'static str {
        "planar"
    }

    fn destination(&self, origin: LatLon, bearing: f64, distance: f64) -> LatLon {
        let theta = bearing.to_radians();
        let north = distance * theta.cos();
        let east = distance * theta.sin();

        let dlat = (north / MEAN_EARTH_RADIUS).to_degrees();
        let dlon = (east / (MEAN_EARTH_RADIUS * origin.lat.to_radians().cos())).to_degrees();

        LatLon::new(
            (origin.lat + dlat).clamp(MIN_LAT, MAX_LAT),
            normalize_longitude(origin.lon + dlon),
        )
    }
}

/// Selectable destination model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Geodesic,
    Spherical,
    Planar,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Geodesic => "geodesic",
            ModelKind::Spherical => "spherical",
            ModelKind::Planar => "planar",
        }
    }

    /// Boxed model instance for this kind.
    pub fn model(&self) -> Box<dyn DestinationModel> {
        match self {
            ModelKind::Geodesic => Box::new(GeodesicModel),
            ModelKind::Spherical => Box::new(SphericalModel),
            ModelKind::Planar => Box::new(PlanarModel),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "geodesic" => Ok(ModelKind::Geodesic),
            "spherical" | "haversine" => Ok(ModelKind::Spherical),
            "planar" => Ok(ModelKind::Planar),
            other => Err(format!(
                "unknown model '{}' (expected geodesic, spherical or planar)",
                other
            )),
        }
    }
}

/// Normalize an angle in degrees into [0, 360).
#[inline]
pub fn normalize_bearing(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Normalize a longitude in degrees into [-180, 180).
#[inline]
pub fn normalize_longitude(degrees: f64) -> f64 {
    let r = (degrees + 180.0).rem_euclid(360.0);
    if r >= 360.0 {
        -180.0
    } else {
        r - 180.0
    }
}
