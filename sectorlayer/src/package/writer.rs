use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use geo::Rect;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Transaction};
use tracing::{debug, info};

use super::geometry;
use super::{
    quote_ident, PackageError, PackageResult, FID_COLUMN, GEOMETRY_COLUMN, WGS84_SRS_ID,
};
use crate::layer::{FieldValue, VectorLayer};

/// SQLite `application_id` for GeoPackage ("GPKG").
const APPLICATION_ID: i32 = 0x4750_4B47;

/// GeoPackage 1.2.0.
const USER_VERSION: i32 = 10200;

const WGS84_WKT: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AXIS["Latitude",NORTH],AXIS["Longitude",EAST],AUTHORITY["EPSG","4326"]]"#;

const METADATA_DDL: &str = r#"
CREATE TABLE gpkg_spatial_ref_sys (
    srs_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL PRIMARY KEY,
    organization TEXT NOT NULL,
    organization_coordsys_id INTEGER NOT NULL,
    definition TEXT NOT NULL,
    description TEXT
);
CREATE TABLE gpkg_contents (
    table_name TEXT NOT NULL PRIMARY KEY,
    data_type TEXT NOT NULL,
    identifier TEXT UNIQUE,
    description TEXT DEFAULT '',
    last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    min_x DOUBLE,
    min_y DOUBLE,
    max_x DOUBLE,
    max_y DOUBLE,
    srs_id INTEGER,
    CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
CREATE TABLE gpkg_geometry_columns (
    table_name TEXT NOT NULL,
    column_name TEXT NOT NULL,
    geometry_type_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL,
    z TINYINT NOT NULL,
    m TINYINT NOT NULL,
    CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
    CONSTRAINT uk_gc_table_name UNIQUE (table_name),
    CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
    CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
"#;

const STYLES_DDL: &str = r#"
CREATE TABLE layer_styles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    f_table_catalog TEXT(256),
    f_table_schema TEXT(256),
    f_table_name TEXT(256),
    f_geometry_column TEXT(256),
    styleName TEXT(30),
    styleQML TEXT,
    styleSLD TEXT,
    useAsDefault BOOLEAN,
    description TEXT,
    owner TEXT(30),
    ui TEXT(30),
    update_time DATETIME DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Options for [`package`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageOptions {
    /// Replace an existing file at the destination.
    pub overwrite: bool,
}

/// What a successful [`package`] call wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    pub path: PathBuf,
    /// `(layer name, feature count)` in package order.
    pub layers: Vec<(String, usize)>,
}

/// Write `layers` into a GeoPackage at `destination`.
///
/// Each layer keeps its name, schema, feature order and style. Nothing is
/// created at `destination` unless every layer was written.
///
/// # Errors
///
/// - [`PackageError::DestinationExists`] when the file exists and
///   `options.overwrite` is false
/// - any [`validate_layers`] failure, before anything touches the disk
/// - [`PackageError::Sqlite`] / [`PackageError::Io`] on storage failures
pub fn package(
    layers: &[VectorLayer],
    destination: &Path,
    options: &PackageOptions,
) -> PackageResult<PackageSummary> {
    if !options.overwrite && destination.exists() {
        return Err(PackageError::DestinationExists(destination.to_path_buf()));
    }
    validate_layers(layers)?;

    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| PackageError::Io {
        path: dir.clone(),
        source: e,
    })?;

    let temp = tempfile::Builder::new()
        .prefix(".sectorlayer-")
        .suffix(".gpkg.tmp")
        .tempfile_in(&dir)
        .map_err(|e| PackageError::Io {
            path: dir.clone(),
            source: e,
        })?;

    let sql_err = |source: rusqlite::Error| PackageError::Sqlite {
        path: destination.to_path_buf(),
        source,
    };

    {
        let mut conn = Connection::open(temp.path()).map_err(sql_err)?;
        write_all(&mut conn, layers).map_err(sql_err)?;
        conn.close().map_err(|(_, e)| sql_err(e))?;
    }

    let persisted = if options.overwrite {
        temp.persist(destination)
    } else {
        temp.persist_noclobber(destination)
    };
    persisted.map_err(|e| {
        if e.error.kind() == ErrorKind::AlreadyExists {
            PackageError::DestinationExists(destination.to_path_buf())
        } else {
            PackageError::Io {
                path: destination.to_path_buf(),
                source: e.error,
            }
        }
    })?;

    let summary = PackageSummary {
        path: destination.to_path_buf(),
        layers: layers
            .iter()
            .map(|l| (l.name().to_string(), l.len()))
            .collect(),
    };
    info!(
        path = %destination.display(),
        layers = layers.len(),
        "GeoPackage written"
    );
    Ok(summary)
}

/// Check that `layers` can be stored together in one package.
///
/// Rejects an empty list, layer names that collide ignoring case, fields
/// named like the reserved `fid`/`geom` columns, invalid geometries and
/// style documents that are not UTF-8 text. Nothing is written.
pub fn validate_layers(layers: &[VectorLayer]) -> PackageResult<()> {
    if layers.is_empty() {
        return Err(PackageError::NoLayers);
    }

    let mut names = HashSet::new();
    for layer in layers {
        if !names.insert(layer.name().to_lowercase()) {
            return Err(PackageError::DuplicateLayer(layer.name().to_string()));
        }
        if let Some(field) = layer.schema().names().find(|n| {
            n.eq_ignore_ascii_case(FID_COLUMN) || n.eq_ignore_ascii_case(GEOMETRY_COLUMN)
        }) {
            return Err(PackageError::ReservedField {
                layer: layer.name().to_string(),
                field: field.to_string(),
            });
        }
        if let Some(feature) = layer.features().iter().position(|f| !f.geometry.is_valid()) {
            return Err(PackageError::InvalidGeometry {
                layer: layer.name().to_string(),
                feature,
            });
        }
        if let Some(style) = layer.style() {
            if std::str::from_utf8(&style.body).is_err() {
                return Err(PackageError::StyleEncoding {
                    layer: layer.name().to_string(),
                    style: style.name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn write_all(conn: &mut Connection, layers: &[VectorLayer]) -> rusqlite::Result<()> {
    conn.pragma_update(None, "application_id", APPLICATION_ID)?;
    conn.pragma_update(None, "user_version", USER_VERSION)?;

    let tx = conn.transaction()?;
    tx.execute_batch(METADATA_DDL)?;
    insert_spatial_ref_sys(&tx)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    for layer in layers {
        write_layer(&tx, layer, &timestamp)?;
    }

    if layers.iter().any(|l| l.style().is_some()) {
        tx.execute_batch(STYLES_DDL)?;
        tx.execute(
            "INSERT INTO gpkg_contents (table_name, data_type, identifier, last_change)
             VALUES ('layer_styles', 'attributes', 'layer_styles', ?1)",
            params![timestamp],
        )?;
        for layer in layers {
            if let Some(style) = layer.style() {
                let qml = std::str::from_utf8(&style.body).map_err(rusqlite::Error::Utf8Error)?;
                tx.execute(
                    "INSERT INTO layer_styles
                     (f_table_catalog, f_table_schema, f_table_name, f_geometry_column,
                      styleName, styleQML, useAsDefault, description, update_time)
                     VALUES ('', '', ?1, ?2, ?3, ?4, 1, '', ?5)",
                    params![
                        layer.name(),
                        GEOMETRY_COLUMN,
                        style.name,
                        qml,
                        timestamp
                    ],
                )?;
            }
        }
    }

    tx.commit()
}

fn insert_spatial_ref_sys(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO gpkg_spatial_ref_sys
         (srs_name, srs_id, organization, organization_coordsys_id, definition, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    stmt.execute(params![
        "WGS 84 geodetic",
        WGS84_SRS_ID,
        "EPSG",
        WGS84_SRS_ID,
        WGS84_WKT,
        "longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid"
    ])?;
    stmt.execute(params![
        "Undefined cartesian SRS",
        -1,
        "NONE",
        -1,
        "undefined",
        "undefined cartesian coordinate reference system"
    ])?;
    stmt.execute(params![
        "Undefined geographic SRS",
        0,
        "NONE",
        0,
        "undefined",
        "undefined geographic coordinate reference system"
    ])?;
    Ok(())
}

fn write_layer(tx: &Transaction<'_>, layer: &VectorLayer, timestamp: &str) -> rusqlite::Result<()> {
    let table = quote_ident(layer.name());

    let mut columns = vec![
        format!("{} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL", FID_COLUMN),
        format!("{} {}", GEOMETRY_COLUMN, layer.kind().as_str()),
    ];
    columns.extend(
        layer
            .schema()
            .fields()
            .iter()
            .map(|f| format!("{} {}", quote_ident(&f.name), f.field_type.sql_type())),
    );
    tx.execute_batch(&format!("CREATE TABLE {} ({});", table, columns.join(", ")))?;

    let extent = layer_extent(layer);
    tx.execute(
        "INSERT INTO gpkg_contents
         (table_name, data_type, identifier, description, last_change,
          min_x, min_y, max_x, max_y, srs_id)
         VALUES (?1, 'features', ?1, '', ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            layer.name(),
            timestamp,
            extent.map(|r| r.min().x),
            extent.map(|r| r.min().y),
            extent.map(|r| r.max().x),
            extent.map(|r| r.max().y),
            WGS84_SRS_ID
        ],
    )?;
    tx.execute(
        "INSERT INTO gpkg_geometry_columns
         (table_name, column_name, geometry_type_name, srs_id, z, m)
         VALUES (?1, ?2, ?3, ?4, 0, 0)",
        params![layer.name(), GEOMETRY_COLUMN, layer.kind().as_str(), WGS84_SRS_ID],
    )?;

    let field_names: Vec<String> = layer.schema().names().map(quote_ident).collect();
    let placeholders: Vec<String> = (1..=field_names.len() + 1).map(|i| format!("?{}", i)).collect();
    let insert = if field_names.is_empty() {
        format!("INSERT INTO {} ({}) VALUES (?1)", table, GEOMETRY_COLUMN)
    } else {
        format!(
            "INSERT INTO {} ({}, {}) VALUES ({})",
            table,
            GEOMETRY_COLUMN,
            field_names.join(", "),
            placeholders.join(", ")
        )
    };

    let mut stmt = tx.prepare(&insert)?;
    for feature in layer.features() {
        let blob = geometry::encode(&feature.geometry, WGS84_SRS_ID);
        let values = std::iter::once(Value::Blob(blob))
            .chain(feature.attributes.iter().map(|(_, v)| to_sql_value(v)));
        stmt.execute(params_from_iter(values))?;
    }

    debug!(layer = layer.name(), features = layer.len(), "Layer table written");
    Ok(())
}

fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(i) => Value::Integer(*i),
        FieldValue::Real(r) => Value::Real(*r),
        FieldValue::Text(s) => Value::Text(s.clone()),
    }
}

fn layer_extent(layer: &VectorLayer) -> Option<Rect<f64>> {
    layer
        .features()
        .iter()
        .filter_map(|f| geometry::envelope(&f.geometry))
        .reduce(|a, b| {
            Rect::new(
                geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}
