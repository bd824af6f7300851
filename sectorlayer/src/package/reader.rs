use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::geometry;
use super::{quote_ident, PackageError, PackageResult, FID_COLUMN};
use crate::layer::{
    assemble, Feature, Field, FieldType, FieldValue, GeometryKind, Schema, Style, VectorLayer,
};

/// Load every feature layer from a GeoPackage, in the order they were written.
///
/// Default styles from `layer_styles` are attached to their layers.
pub fn read_package(path: &Path) -> PackageResult<Vec<VectorLayer>> {
    let sql_err = |source: rusqlite::Error| PackageError::Sqlite {
        path: path.to_path_buf(),
        source,
    };

    let conn =
        Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(sql_err)?;

    let tables: Vec<(String, String, String)> = {
        let mut stmt = conn
            .prepare(
                "SELECT c.table_name, g.column_name, g.geometry_type_name
                 FROM gpkg_contents c
                 JOIN gpkg_geometry_columns g ON g.table_name = c.table_name
                 WHERE c.data_type = 'features'
                 ORDER BY c.rowid",
            )
            .map_err(sql_err)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .map_err(sql_err)?;
        rows.collect::<Result<_, _>>().map_err(sql_err)?
    };

    let has_styles: bool = conn
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'layer_styles')",
            [],
            |row| row.get(0),
        )
        .map_err(sql_err)?;

    let mut layers = Vec::with_capacity(tables.len());
    for (table, geom_column, type_name) in tables {
        let kind = GeometryKind::from_name(&type_name).ok_or_else(|| {
            PackageError::UnsupportedGeometryType {
                layer: table.clone(),
                geometry_type: type_name.clone(),
            }
        })?;

        let schema = read_schema(&conn, &table, &geom_column).map_err(sql_err)?;
        let features = read_features(&conn, path, &table, &geom_column, &schema)?;
        let style = if has_styles {
            read_style(&conn, &table).map_err(sql_err)?
        } else {
            None
        };

        layers.push(assemble(&table, kind, features, schema, style)?);
    }
    Ok(layers)
}

fn read_schema(conn: &Connection, table: &str, geom_column: &str) -> rusqlite::Result<Schema> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let columns = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;

    let mut fields = Vec::new();
    for column in columns {
        let (name, sql_type) = column?;
        if name.eq_ignore_ascii_case(FID_COLUMN) || name.eq_ignore_ascii_case(geom_column) {
            continue;
        }
        fields.push(Field::new(name, FieldType::from_sql_type(&sql_type)));
    }
    Ok(Schema::new(fields))
}

fn read_features(
    conn: &Connection,
    path: &Path,
    table: &str,
    geom_column: &str,
    schema: &Schema,
) -> PackageResult<Vec<Feature>> {
    let sql_err = |source: rusqlite::Error| PackageError::Sqlite {
        path: path.to_path_buf(),
        source,
    };

    let mut columns = vec![quote_ident(geom_column)];
    columns.extend(schema.names().map(quote_ident));
    let query = format!(
        "SELECT {} FROM {} ORDER BY {}",
        columns.join(", "),
        quote_ident(table),
        FID_COLUMN
    );

    let mut stmt = conn.prepare(&query).map_err(sql_err)?;
    let mut rows = stmt.query([]).map_err(sql_err)?;

    let mut features = Vec::new();
    while let Some(row) = rows.next().map_err(sql_err)? {
        let index = features.len();
        let blob: Vec<u8> = row.get(0).map_err(sql_err)?;
        let geometry = geometry::decode(&blob).map_err(|reason| PackageError::CorruptGeometry {
            layer: table.to_string(),
            feature: index,
            reason,
        })?;

        let mut attributes = Vec::with_capacity(schema.len());
        for (i, field) in schema.fields().iter().enumerate() {
            let value = match row.get_ref(i + 1).map_err(sql_err)? {
                ValueRef::Null => FieldValue::Null,
                ValueRef::Integer(v) => match field.field_type {
                    FieldType::Real => FieldValue::Real(v as f64),
                    _ => FieldValue::Integer(v),
                },
                ValueRef::Real(v) => FieldValue::Real(v),
                ValueRef::Text(t) => FieldValue::Text(String::from_utf8_lossy(t).into_owned()),
                ValueRef::Blob(_) => {
                    return Err(PackageError::UnsupportedValue {
                        layer: table.to_string(),
                        column: field.name.clone(),
                    })
                }
            };
            attributes.push((field.name.clone(), value));
        }
        features.push(Feature::new(geometry, attributes));
    }
    Ok(features)
}

fn read_style(conn: &Connection, table: &str) -> rusqlite::Result<Option<Style>> {
    conn.query_row(
        "SELECT styleName, styleQML FROM layer_styles
         WHERE f_table_name = ?1
         ORDER BY useAsDefault DESC, id
         LIMIT 1",
        params![table],
        |row| {
            let name: Option<String> = row.get(0)?;
            let body: Option<String> = row.get(1)?;
            Ok(Style::new(
                name.unwrap_or_default(),
                body.unwrap_or_default().into_bytes(),
            ))
        },
    )
    .optional()
}
