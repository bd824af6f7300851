use std::fs;

use geo::Point;
use rusqlite::Connection;
use tempfile::TempDir;

use super::*;
use crate::layer::{
    assemble, Feature, Field, FieldType, FieldValue, Geometry, GeometryKind, Schema, Style,
    VectorLayer,
};
use crate::sector::{generate, LatLon, ModelKind};

fn sites() -> VectorLayer {
    let schema = Schema::new(vec![
        Field::new("Site_ID", FieldType::Integer),
        Field::new("Name", FieldType::Text),
        Field::new("Height", FieldType::Real),
    ]);
    let features = vec![
        Feature::new(
            Geometry::Point(Point::new(-3.0, 40.0)),
            vec![
                ("Site_ID".into(), FieldValue::Integer(1)),
                ("Name".into(), FieldValue::Text("Alcalá".into())),
                ("Height".into(), FieldValue::Real(25.5)),
            ],
        ),
        Feature::new(
            Geometry::Point(Point::new(-3.5, 41.0)),
            vec![
                ("Site_ID".into(), FieldValue::Integer(2)),
                ("Name".into(), FieldValue::Null),
                ("Height".into(), FieldValue::Null),
            ],
        ),
    ];
    let style = Style::new("style_Sites", b"<qgis version=\"3.28\"/>".to_vec());
    assemble("Sites_for_GE", GeometryKind::Point, features, schema, Some(style)).unwrap()
}

fn sectors() -> VectorLayer {
    let schema = Schema::new(vec![
        Field::new("Site_ID", FieldType::Integer),
        Field::new("Azimuth", FieldType::Integer),
    ]);
    let features = [(0, 0), (1, 120), (1, 240)]
        .iter()
        .map(|&(site, azimuth)| {
            let sector = generate(
                LatLon::new(40.0, -3.0),
                azimuth as f64,
                60.0,
                200.0,
                8,
                ModelKind::Geodesic,
            )
            .unwrap();
            Feature::new(
                Geometry::Polygon(sector.to_polygon()),
                vec![
                    ("Site_ID".into(), FieldValue::Integer(site)),
                    ("Azimuth".into(), FieldValue::Integer(azimuth)),
                ],
            )
        })
        .collect();
    assemble("cellFile", GeometryKind::Polygon, features, schema, None).unwrap()
}

#[test]
fn test_round_trip_preserves_layers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Cells_for_GE.gpkg");
    let layers = vec![sites(), sectors()];

    let summary = package(&layers, &path, &PackageOptions::default()).unwrap();
    assert_eq!(
        summary.layers,
        vec![("Sites_for_GE".to_string(), 2), ("cellFile".to_string(), 3)]
    );

    let read = read_package(&path).unwrap();
    assert_eq!(read, layers);
}

#[test]
fn test_metadata_tables() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.gpkg");
    package(&[sectors()], &path, &PackageOptions::default()).unwrap();

    let conn = Connection::open(&path).unwrap();
    let app_id: i32 = conn
        .query_row("PRAGMA application_id", [], |r| r.get(0))
        .unwrap();
    assert_eq!(app_id, 0x4750_4B47);

    let srs: Vec<i32> = conn
        .prepare("SELECT srs_id FROM gpkg_spatial_ref_sys ORDER BY srs_id")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(srs, vec![-1, 0, 4326]);

    let (kind, srs_id): (String, i32) = conn
        .query_row(
            "SELECT geometry_type_name, srs_id FROM gpkg_geometry_columns WHERE table_name = 'cellFile'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(kind, "POLYGON");
    assert_eq!(srs_id, 4326);

    let (min_x, max_y): (f64, f64) = conn
        .query_row(
            "SELECT min_x, max_y FROM gpkg_contents WHERE table_name = 'cellFile'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert!(min_x < -3.0);
    assert!(max_y > 40.0);

    // No styles attached, so no styles table.
    let styles: bool = conn
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE name = 'layer_styles')",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert!(!styles);
}

#[test]
fn test_style_marked_default() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Sites_for_GE.gpkg");
    package(&[sites()], &path, &PackageOptions::default()).unwrap();

    let conn = Connection::open(&path).unwrap();
    let (table, qml, default): (String, String, bool) = conn
        .query_row(
            "SELECT f_table_name, styleQML, useAsDefault FROM layer_styles",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(table, "Sites_for_GE");
    assert_eq!(qml, "<qgis version=\"3.28\"/>");
    assert!(default);
}

#[test]
fn test_existing_destination_is_kept() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Sites_for_GE.gpkg");
    fs::write(&path, b"previous").unwrap();

    let result = package(&[sites()], &path, &PackageOptions::default());
    assert!(matches!(result, Err(PackageError::DestinationExists(_))));
    assert_eq!(fs::read(&path).unwrap(), b"previous");
}

#[test]
fn test_overwrite_replaces_destination() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Sites_for_GE.gpkg");
    fs::write(&path, b"previous").unwrap();

    package(&[sites()], &path, &PackageOptions { overwrite: true }).unwrap();
    assert_eq!(read_package(&path).unwrap().len(), 1);
}

#[test]
fn test_invalid_geometry_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.gpkg");

    let schema = Schema::new(vec![Field::new("Site_ID", FieldType::Integer)]);
    let features = vec![
        Feature::new(
            Geometry::Point(Point::new(1.0, 1.0)),
            vec![("Site_ID".into(), FieldValue::Integer(1))],
        ),
        Feature::new(
            Geometry::Point(Point::new(f64::NAN, 1.0)),
            vec![("Site_ID".into(), FieldValue::Integer(2))],
        ),
    ];
    let layer = assemble("bad", GeometryKind::Point, features, schema, None).unwrap();

    match package(&[layer], &path, &PackageOptions::default()) {
        Err(PackageError::InvalidGeometry { layer, feature }) => {
            assert_eq!(layer, "bad");
            assert_eq!(feature, 1);
        }
        other => panic!("expected InvalidGeometry, got {:?}", other),
    }
    assert!(!path.exists());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_duplicate_layer_names_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dup.gpkg");

    let result = package(&[sites(), sites()], &path, &PackageOptions::default());
    assert!(matches!(result, Err(PackageError::DuplicateLayer(name)) if name == "Sites_for_GE"));
}

#[test]
fn test_reserved_field_rejected() {
    let temp = TempDir::new().unwrap();
    let schema = Schema::new(vec![Field::new("FID", FieldType::Integer)]);
    let features = vec![Feature::new(
        Geometry::Point(Point::new(1.0, 1.0)),
        vec![("FID".into(), FieldValue::Integer(1))],
    )];
    let layer = assemble("t", GeometryKind::Point, features, schema, None).unwrap();

    let result = package(&[layer], &temp.path().join("t.gpkg"), &PackageOptions::default());
    assert!(matches!(result, Err(PackageError::ReservedField { .. })));
}

#[test]
fn test_non_utf8_style_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("latin1.gpkg");
    let schema = Schema::new(vec![Field::new("Site_ID", FieldType::Integer)]);
    let features = vec![Feature::new(
        Geometry::Point(Point::new(1.0, 1.0)),
        vec![("Site_ID".into(), FieldValue::Integer(1))],
    )];
    // "Alcalá" in Latin-1
    let style = Style::new("style_Sites", b"<qgis name=\"Alcal\xe1\"/>".to_vec());
    let layer = assemble("Sites_for_GE", GeometryKind::Point, features, schema, Some(style)).unwrap();

    match validate_layers(std::slice::from_ref(&layer)) {
        Err(PackageError::StyleEncoding { layer, style }) => {
            assert_eq!(layer, "Sites_for_GE");
            assert_eq!(style, "style_Sites");
        }
        other => panic!("expected StyleEncoding, got {:?}", other),
    }
    let result = package(&[layer], &path, &PackageOptions::default());
    assert!(matches!(result, Err(PackageError::StyleEncoding { .. })));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_validate_layers_accepts_packageable_set() {
    assert!(validate_layers(&[sites(), sectors()]).is_ok());
    assert!(matches!(validate_layers(&[]), Err(PackageError::NoLayers)));
}

#[test]
fn test_empty_layer_round_trips() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("empty.gpkg");
    let schema = Schema::new(vec![Field::new("Site_ID", FieldType::Text)]);
    let layer = assemble("cellFile", GeometryKind::Polygon, vec![], schema, None).unwrap();

    package(&[layer.clone()], &path, &PackageOptions::default()).unwrap();
    assert_eq!(read_package(&path).unwrap(), vec![layer]);
}
