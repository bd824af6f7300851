//! Vector layer type definitions

use std::fmt;

use geo::{Point, Polygon};

/// Geometry kind shared by all features of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Polygon,
}

impl GeometryKind {
    /// OGC geometry type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::Polygon => "POLYGON",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "POINT" => Some(GeometryKind::Point),
            "POLYGON" => Some(GeometryKind::Polygon),
            _ => None,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature geometry in geographic coordinates (x = longitude, y = latitude).
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// All coordinates are finite and polygon rings are closed with at least
    /// four vertices.
    pub fn is_valid(&self) -> bool {
        match self {
            Geometry::Point(p) => p.x().is_finite() && p.y().is_finite(),
            Geometry::Polygon(polygon) => std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .all(|ring| {
                    ring.0.len() >= 4
                        && ring.is_closed()
                        && ring.coords().all(|c| c.x.is_finite() && c.y.is_finite())
                }),
        }
    }
}

/// Attribute storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Real,
    Text,
}

impl FieldType {
    /// SQL column type.
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldType::Integer => "INTEGER",
            FieldType::Real => "REAL",
            FieldType::Text => "TEXT",
        }
    }

    pub fn from_sql_type(sql: &str) -> Self {
        let sql = sql.to_uppercase();
        if sql.contains("INT") {
            FieldType::Integer
        } else if sql.contains("REAL") || sql.contains("FLOA") || sql.contains("DOUB") {
            FieldType::Real
        } else {
            FieldType::Text
        }
    }

    /// Narrowest type that holds every non-blank value.
    ///
    /// A column with no values at all is text.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut seen = false;
        let mut integer = true;
        let mut real = true;

        for raw in values {
            let v = raw.trim();
            if v.is_empty() {
                continue;
            }
            seen = true;
            if integer && v.parse::<i64>().is_err() {
                integer = false;
            }
            if real && !v.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
                real = false;
            }
            if !integer && !real {
                break;
            }
        }

        match (seen, integer, real) {
            (true, true, _) => FieldType::Integer,
            (true, false, true) => FieldType::Real,
            _ => FieldType::Text,
        }
    }

    /// Convert a raw text value; blanks become null.
    pub fn parse(&self, raw: &str) -> FieldValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Null;
        }
        match self {
            FieldType::Integer => trimmed
                .parse()
                .map(FieldValue::Integer)
                .unwrap_or_else(|_| FieldValue::Text(raw.to_string())),
            FieldType::Real => trimmed
                .parse()
                .map(FieldValue::Real)
                .unwrap_or_else(|_| FieldValue::Text(raw.to_string())),
            FieldType::Text => FieldValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "NULL",
            FieldValue::Integer(_) => "INTEGER",
            FieldValue::Real(_) => "REAL",
            FieldValue::Text(_) => "TEXT",
        }
    }

    /// Whether this value may be stored in a field of `field_type`.
    pub fn fits(&self, field_type: FieldType) -> bool {
        matches!(
            (self, field_type),
            (FieldValue::Null, _)
                | (FieldValue::Integer(_), FieldType::Integer | FieldType::Real)
                | (FieldValue::Real(_), FieldType::Real)
                | (FieldValue::Text(_), FieldType::Text)
        )
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Real(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
        }
    }
}

/// A named, typed attribute column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered attribute fields of a layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// A geometry with its named attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub attributes: Vec<(String, FieldValue)>,
}

impl Feature {
    pub fn new(geometry: Geometry, attributes: Vec<(String, FieldValue)>) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    /// Value of a named attribute.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Opaque style document attached to a layer (e.g. a QGIS `.qml` file).
///
/// The contents are never interpreted, only carried to the outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub name: String,
    pub body: Vec<u8>,
}

impl Style {
    pub fn new(name: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

/// Named collection of features sharing a geometry kind and schema.
///
/// Only built through [`super::assemble`], which guarantees every feature
/// matches the schema and geometry kind; attributes are in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayer {
    pub(super) name: String,
    pub(super) kind: GeometryKind,
    pub(super) schema: Schema,
    pub(super) features: Vec<Feature>,
    pub(super) style: Option<Style>,
}

impl VectorLayer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
