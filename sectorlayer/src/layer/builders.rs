//! Layers built from inventory records.

use geo::Point;

use super::assemble::assemble;
use super::types::{Feature, Field, FieldType, Geometry, GeometryKind, Schema, Style, VectorLayer};
use super::LayerError;
use crate::inventory::{CellSet, Record, RecordSet, SiteSet};
use crate::sector::SectorPolygon;

/// Schema with one field per column, typed by inspecting every value.
pub fn infer_schema<R: Record>(set: &RecordSet<R>) -> Schema {
    let fields = set
        .headers
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let field_type =
                FieldType::infer(set.records.iter().map(|r| r.values()[col].as_str()));
            Field::new(name.clone(), field_type)
        })
        .collect();
    Schema::new(fields)
}

fn record_feature<R: Record>(record: &R, schema: &Schema, geometry: Geometry) -> Feature {
    let attributes = schema
        .fields()
        .iter()
        .zip(record.values())
        .map(|(field, raw)| (field.name.clone(), field.field_type.parse(raw)))
        .collect();
    Feature::new(geometry, attributes)
}

fn point_layer<R: Record>(
    name: &str,
    set: &RecordSet<R>,
    style: Option<Style>,
) -> Result<VectorLayer, LayerError> {
    let schema = infer_schema(set);
    let features = set
        .records
        .iter()
        .map(|r| record_feature(r, &schema, Geometry::Point(Point::from(r.position()))))
        .collect();
    assemble(name, GeometryKind::Point, features, schema, style)
}

/// Point layer of sites at their coordinates.
pub fn sites_layer(
    name: &str,
    sites: &SiteSet,
    style: Option<Style>,
) -> Result<VectorLayer, LayerError> {
    point_layer(name, sites, style)
}

/// Point layer of cells at their own coordinates.
pub fn cells_layer(
    name: &str,
    cells: &CellSet,
    style: Option<Style>,
) -> Result<VectorLayer, LayerError> {
    point_layer(name, cells, style)
}

/// Polygon layer of coverage wedges, one per cell, carrying the cell's
/// attributes. `polygons[i]` must be the wedge of `cells.records[i]`.
pub fn sectors_layer(
    name: &str,
    cells: &CellSet,
    polygons: Vec<SectorPolygon>,
    style: Option<Style>,
) -> Result<VectorLayer, LayerError> {
    if polygons.len() != cells.len() {
        return Err(LayerError::CountMismatch {
            layer: name.to_string(),
            records: cells.len(),
            geometries: polygons.len(),
        });
    }

    let schema = infer_schema(cells);
    let features = cells
        .records
        .iter()
        .zip(polygons)
        .map(|(cell, polygon)| {
            record_feature(cell, &schema, Geometry::Polygon(polygon.to_polygon()))
        })
        .collect();
    assemble(name, GeometryKind::Polygon, features, schema, style)
}
