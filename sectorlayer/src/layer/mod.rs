//! Vector layers: named feature collections with a typed attribute schema.
//!
//! [`assemble`] is the only way to build a [`VectorLayer`]; it rejects any
//! feature whose attributes do not match the declared [`Schema`]. The
//! [`builders`] turn inventory records and sector polygons into layers.

mod assemble;
pub mod builders;
mod types;

use thiserror::Error;

pub use assemble::assemble;
pub use builders::{cells_layer, infer_schema, sectors_layer, sites_layer};
pub use types::{
    Feature, Field, FieldType, FieldValue, Geometry, GeometryKind, Schema, Style, VectorLayer,
};

/// Schema violations raised while assembling a layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error("Layer name must not be empty")]
    EmptyName,

    #[error("Layer '{layer}': invalid field name '{field}'")]
    InvalidFieldName { layer: String, field: String },

    #[error("Layer '{layer}': field '{field}' is declared more than once")]
    DuplicateField { layer: String, field: String },

    #[error("Layer '{layer}' feature {feature}: missing field '{field}'")]
    MissingField {
        layer: String,
        feature: usize,
        field: String,
    },

    #[error("Layer '{layer}' feature {feature}: field '{field}' is not in the schema")]
    UnexpectedField {
        layer: String,
        feature: usize,
        field: String,
    },

    #[error("Layer '{layer}' feature {feature}: field '{field}' given more than once")]
    RepeatedAttribute {
        layer: String,
        feature: usize,
        field: String,
    },

    #[error("Layer '{layer}' feature {feature}: field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        layer: String,
        feature: usize,
        field: String,
        expected: FieldType,
        found: &'static str,
    },

    #[error("Layer '{layer}' feature {feature}: expected {expected} geometry, got {found}")]
    GeometryKindMismatch {
        layer: String,
        feature: usize,
        expected: GeometryKind,
        found: GeometryKind,
    },

    #[error("Layer '{layer}': {records} records but {geometries} geometries")]
    CountMismatch {
        layer: String,
        records: usize,
        geometries: usize,
    },
}
