//! Sector geometry type definitions

use geo::{Coord, LineString, Point, Polygon};
use thiserror::Error;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Beamwidth that produces a full ring instead of a wedge.
pub const FULL_CIRCLE: f64 = 360.0;

/// Fewest arc samples that give a full circle a non-zero area.
pub const MIN_FULL_CIRCLE_SEGMENTS: u32 = 3;

/// Tolerance used when deciding whether a beamwidth is a full circle.
const FULL_CIRCLE_EPSILON: f64 = 1e-9;

/// True when `beamwidth` covers the whole horizon.
pub fn is_full_circle(beamwidth: f64) -> bool {
    (FULL_CIRCLE - beamwidth).abs() < FULL_CIRCLE_EPSILON
}

/// Geographic position in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    /// Latitude, positive north
    pub lat: f64,
    /// Longitude, positive east
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLon> for Point<f64> {
    fn from(p: LatLon) -> Self {
        Point::new(p.lon, p.lat)
    }
}

impl From<Point<f64>> for LatLon {
    fn from(p: Point<f64>) -> Self {
        LatLon::new(p.y(), p.x())
    }
}

impl From<LatLon> for Coord<f64> {
    fn from(p: LatLon) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

/// Input to a single sector generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorRequest {
    /// Apex of the wedge (antenna position)
    pub origin: LatLon,
    /// Central bearing, degrees clockwise from true north
    pub azimuth: f64,
    /// Angular width of the wedge in degrees, (0, 360]
    pub beamwidth: f64,
    /// Wedge radius in meters
    pub radius: f64,
    /// Number of equal angular steps along the arc
    pub segments: u32,
}

impl SectorRequest {
    pub fn new(origin: LatLon, azimuth: f64, beamwidth: f64, radius: f64, segments: u32) -> Self {
        Self {
            origin,
            azimuth,
            beamwidth,
            radius,
            segments,
        }
    }

    /// True when the beamwidth covers the whole horizon.
    pub fn is_full_circle(&self) -> bool {
        is_full_circle(self.beamwidth)
    }

    /// Check every parameter against its valid range.
    pub fn validate(&self) -> Result<(), SectorError> {
        let LatLon { lat, lon } = self.origin;
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(SectorError::invalid("latitude", lat, "must be within [-90, 90]"));
        }
        if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(SectorError::invalid("longitude", lon, "must be within [-180, 180]"));
        }
        if lat.abs() == MAX_LAT {
            return Err(SectorError::DegenerateOrigin { lat, lon });
        }
        if !self.azimuth.is_finite() {
            return Err(SectorError::invalid("azimuth", self.azimuth, "must be a finite number"));
        }
        if !self.beamwidth.is_finite() || self.beamwidth <= 0.0 || self.beamwidth > FULL_CIRCLE {
            return Err(SectorError::invalid(
                "beamwidth",
                self.beamwidth,
                "must be within (0, 360]",
            ));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SectorError::invalid("radius", self.radius, "must be greater than 0"));
        }
        if self.segments < 1 {
            return Err(SectorError::invalid(
                "segments",
                self.segments as f64,
                "must be at least 1",
            ));
        }
        if self.is_full_circle() && self.segments < MIN_FULL_CIRCLE_SEGMENTS {
            return Err(SectorError::invalid(
                "segments",
                self.segments as f64,
                "must be at least 3 for a 360 degree beamwidth",
            ));
        }
        Ok(())
    }
}

/// Closed polygon approximating an antenna coverage wedge.
///
/// For a wedge the ring is `[apex, arc_0, .., arc_n, apex]`. For a full
/// circle the apex is omitted and the ring is `[arc_0, .., arc_{n-1}, arc_0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorPolygon {
    apex: Option<LatLon>,
    ring: Vec<LatLon>,
}

impl SectorPolygon {
    pub(super) fn wedge(apex: LatLon, arc: Vec<LatLon>) -> Self {
        let mut ring = Vec::with_capacity(arc.len() + 2);
        ring.push(apex);
        ring.extend(arc);
        ring.push(apex);
        Self {
            apex: Some(apex),
            ring,
        }
    }

    pub(super) fn circle(mut arc: Vec<LatLon>) -> Self {
        if let Some(first) = arc.first().copied() {
            arc.push(first);
        }
        Self {
            apex: None,
            ring: arc,
        }
    }

    /// Apex vertex, `None` for a full circle.
    pub fn apex(&self) -> Option<LatLon> {
        self.apex
    }

    /// Closed vertex ring in generation order.
    pub fn ring(&self) -> &[LatLon] {
        &self.ring
    }

    /// Arc samples only (apex and closing vertex excluded for wedges).
    pub fn arc(&self) -> &[LatLon] {
        match self.apex {
            Some(_) => &self.ring[1..self.ring.len() - 1],
            None => &self.ring,
        }
    }

    pub fn is_full_circle(&self) -> bool {
        self.apex.is_none()
    }

    /// First vertex equals last vertex.
    pub fn is_closed(&self) -> bool {
        match (self.ring.first(), self.ring.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Convert into a `geo` polygon (x = longitude, y = latitude).
    pub fn to_polygon(&self) -> Polygon<f64> {
        let exterior: LineString<f64> = self.ring.iter().map(|p| Coord::from(*p)).collect();
        Polygon::new(exterior, Vec::new())
    }
}

/// Errors raised by sector generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SectorError {
    /// A generation parameter is outside its valid range
    #[error("invalid {name}: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Origin sits on a pole where bearings are undefined
    #[error("degenerate origin at ({lat}, {lon}): bearings are undefined at the poles")]
    DegenerateOrigin { lat: f64, lon: f64 },

    /// Generation failed for a specific cell of a batch
    #[error("cell {index} (site '{site_id}'): {source}")]
    Cell {
        index: usize,
        site_id: String,
        #[source]
        source: Box<SectorError>,
    },
}

impl SectorError {
    fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        SectorError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}
