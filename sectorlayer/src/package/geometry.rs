//! GeoPackage binary geometry encoding.
//!
//! ```text
//! "GP" | version u8 | flags u8 | srs_id i32 | envelope f64* | WKB
//! ```
//!
//! Flags: bit 0 = byte order (1 = little endian), bits 1-3 = envelope
//! contents (0 none, 1 = minx, maxx, miny, maxy). Everything is written
//! little endian; both byte orders are accepted when reading.

use geo::{BoundingRect, Coord, LineString, Point, Polygon, Rect};

use crate::layer::Geometry;

const MAGIC: [u8; 2] = *b"GP";
const VERSION: u8 = 0;
const FLAG_LITTLE_ENDIAN: u8 = 0b0000_0001;
const FLAG_EMPTY: u8 = 0b0001_0000;
const ENVELOPE_XY: u8 = 1;

const WKB_POINT: u32 = 1;
const WKB_POLYGON: u32 = 3;

/// Encode a geometry as a GeoPackage blob.
///
/// Polygons carry an XY envelope; points do not.
pub fn encode(geometry: &Geometry, srs_id: i32) -> Vec<u8> {
    let envelope = match geometry {
        Geometry::Point(_) => None,
        Geometry::Polygon(p) => p.bounding_rect(),
    };
    let envelope_code = if envelope.is_some() { ENVELOPE_XY } else { 0 };

    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.push(FLAG_LITTLE_ENDIAN | (envelope_code << 1));
    out.extend_from_slice(&srs_id.to_le_bytes());
    if let Some(rect) = envelope {
        for v in [rect.min().x, rect.max().x, rect.min().y, rect.max().y] {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    out.push(1); // WKB little endian
    match geometry {
        Geometry::Point(p) => {
            out.extend_from_slice(&WKB_POINT.to_le_bytes());
            write_coord(&mut out, p.0);
        }
        Geometry::Polygon(p) => {
            out.extend_from_slice(&WKB_POLYGON.to_le_bytes());
            let rings = 1 + p.interiors().len() as u32;
            out.extend_from_slice(&rings.to_le_bytes());
            for ring in std::iter::once(p.exterior()).chain(p.interiors()) {
                out.extend_from_slice(&(ring.0.len() as u32).to_le_bytes());
                for c in ring.coords() {
                    write_coord(&mut out, *c);
                }
            }
        }
    }
    out
}

fn write_coord(out: &mut Vec<u8>, c: Coord<f64>) {
    out.extend_from_slice(&c.x.to_le_bytes());
    out.extend_from_slice(&c.y.to_le_bytes());
}

/// Envelope of a geometry, used for layer extents.
pub fn envelope(geometry: &Geometry) -> Option<Rect<f64>> {
    match geometry {
        Geometry::Point(p) => Some(p.bounding_rect()),
        Geometry::Polygon(p) => p.bounding_rect(),
    }
}

/// Decode a GeoPackage blob. Returns a description of the problem on failure.
pub fn decode(blob: &[u8]) -> Result<Geometry, String> {
    let mut cursor = Cursor::new(blob);

    if cursor.take(2)? != MAGIC {
        return Err("missing GP magic".to_string());
    }
    let _version = cursor.u8()?;
    let flags = cursor.u8()?;
    if flags & FLAG_EMPTY != 0 {
        return Err("empty geometries are not supported".to_string());
    }
    cursor.little_endian = flags & FLAG_LITTLE_ENDIAN != 0;
    let _srs_id = cursor.u32()?;
    let envelope_len = match (flags >> 1) & 0b111 {
        0 => 0,
        1 => 32,
        2 | 3 => 48,
        4 => 64,
        other => return Err(format!("invalid envelope code {}", other)),
    };
    cursor.take(envelope_len)?;

    cursor.little_endian = cursor.u8()? == 1;
    match cursor.u32()? {
        WKB_POINT => Ok(Geometry::Point(Point(cursor.coord()?))),
        WKB_POLYGON => {
            let ring_count = cursor.u32()?;
            // Every ring carries at least its 4-byte point count
            let capacity = (ring_count as usize).min(cursor.remaining() / 4);
            let mut rings = Vec::with_capacity(capacity);
            for _ in 0..ring_count {
                let n = cursor.u32()?;
                let coords = (0..n)
                    .map(|_| cursor.coord())
                    .collect::<Result<Vec<_>, _>>()?;
                rings.push(LineString::new(coords));
            }
            let mut rings = rings.into_iter();
            let exterior = rings
                .next()
                .ok_or_else(|| "polygon without rings".to_string())?;
            Ok(Geometry::Polygon(Polygon::new(exterior, rings.collect())))
        }
        other => Err(format!("unsupported WKB geometry type {}", other)),
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    little_endian: bool,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            little_endian: true,
        }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], String> {
        let end = self.pos + n;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or_else(|| format!("truncated geometry at byte {}", self.pos))?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, String> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, String> {
        let mut b = [0u8; 4];
        b.copy_from_slice(self.take(4)?);
        Ok(if self.little_endian {
            u32::from_le_bytes(b)
        } else {
            u32::from_be_bytes(b)
        })
    }

    fn f64(&mut self) -> Result<f64, String> {
        let mut b = [0u8; 8];
        b.copy_from_slice(self.take(8)?);
        Ok(if self.little_endian {
            f64::from_le_bytes(b)
        } else {
            f64::from_be_bytes(b)
        })
    }

    fn coord(&mut self) -> Result<Coord<f64>, String> {
        let x = self.f64()?;
        let y = self.f64()?;
        Ok(Coord { x, y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_point_layout() {
        let blob = encode(&Geometry::Point(Point::new(-3.0, 40.0)), 4326);

        assert_eq!(&blob[0..2], b"GP");
        assert_eq!(blob[2], 0);
        assert_eq!(blob[3], 0b0000_0001);
        assert_eq!(i32::from_le_bytes(blob[4..8].try_into().unwrap()), 4326);
        // header (8) + WKB point (1 + 4 + 16)
        assert_eq!(blob.len(), 29);
        assert_eq!(blob[8], 1);
        assert_eq!(u32::from_le_bytes(blob[9..13].try_into().unwrap()), 1);
    }

    #[test]
    fn test_polygon_envelope_and_order() {
        let wedge = polygon![
            (x: -3.0, y: 40.0),
            (x: -2.99, y: 40.01),
            (x: -2.98, y: 40.0),
            (x: -3.0, y: 40.0),
        ];
        let geometry = Geometry::Polygon(wedge);
        let blob = encode(&geometry, 4326);

        assert_eq!(blob[3], 0b0000_0011);
        let minx = f64::from_le_bytes(blob[8..16].try_into().unwrap());
        let maxy = f64::from_le_bytes(blob[32..40].try_into().unwrap());
        assert_eq!(minx, -3.0);
        assert_eq!(maxy, 40.01);

        assert_eq!(decode(&blob).unwrap(), geometry);
    }

    #[test]
    fn test_decode_big_endian_wkb() {
        let mut blob = vec![b'G', b'P', 0, 0];
        blob.extend_from_slice(&4326u32.to_be_bytes());
        blob.push(0);
        blob.extend_from_slice(&1u32.to_be_bytes());
        blob.extend_from_slice(&1.5f64.to_be_bytes());
        blob.extend_from_slice(&2.5f64.to_be_bytes());

        assert_eq!(decode(&blob).unwrap(), Geometry::Point(Point::new(1.5, 2.5)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"XX").is_err());
        assert!(decode(b"GP\x00\x01").is_err());
    }

    #[test]
    fn test_decode_rejects_inflated_ring_count() {
        let mut blob = vec![b'G', b'P', 0, 0b0000_0001];
        blob.extend_from_slice(&4326u32.to_le_bytes());
        blob.push(1);
        blob.extend_from_slice(&3u32.to_le_bytes());
        blob.extend_from_slice(&u32::MAX.to_le_bytes());
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&1.5f64.to_le_bytes());
        blob.extend_from_slice(&2.5f64.to_le_bytes());

        let err = decode(&blob).unwrap_err();
        assert!(err.contains("truncated"), "{}", err);
    }
}
