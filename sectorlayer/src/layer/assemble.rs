//! Layer assembly and schema validation.

use std::collections::HashSet;

use tracing::debug;

use super::types::{Feature, FieldValue, GeometryKind, Schema, Style, VectorLayer};
use super::LayerError;

/// Build a layer, checking every feature against the declared schema.
///
/// Each feature must carry exactly the schema's field names (null values
/// included) with values that fit the field types, and a geometry of
/// `kind`. Attributes are reordered to schema order. The style is attached
/// as-is.
pub fn assemble(
    name: &str,
    kind: GeometryKind,
    features: Vec<Feature>,
    schema: Schema,
    style: Option<Style>,
) -> Result<VectorLayer, LayerError> {
    if name.trim().is_empty() {
        return Err(LayerError::EmptyName);
    }
    validate_schema(name, &schema)?;

    let features = features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| conform(name, kind, &schema, index, feature))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        layer = name,
        kind = %kind,
        fields = schema.len(),
        features = features.len(),
        styled = style.is_some(),
        "Assembled layer"
    );

    Ok(VectorLayer {
        name: name.to_string(),
        kind,
        schema,
        features,
        style,
    })
}

fn validate_schema(layer: &str, schema: &Schema) -> Result<(), LayerError> {
    let mut seen = HashSet::new();
    for field in schema.fields() {
        if field.name.trim().is_empty() {
            return Err(LayerError::InvalidFieldName {
                layer: layer.to_string(),
                field: field.name.clone(),
            });
        }
        // Names are compared case-insensitively since SQL column names are
        if !seen.insert(field.name.to_lowercase()) {
            return Err(LayerError::DuplicateField {
                layer: layer.to_string(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn conform(
    layer: &str,
    kind: GeometryKind,
    schema: &Schema,
    index: usize,
    feature: Feature,
) -> Result<Feature, LayerError> {
    if feature.geometry.kind() != kind {
        return Err(LayerError::GeometryKindMismatch {
            layer: layer.to_string(),
            feature: index,
            expected: kind,
            found: feature.geometry.kind(),
        });
    }

    let mut slots: Vec<Option<FieldValue>> = vec![None; schema.len()];
    for (field_name, value) in feature.attributes {
        let slot = schema
            .index_of(&field_name)
            .ok_or_else(|| LayerError::UnexpectedField {
                layer: layer.to_string(),
                feature: index,
                field: field_name.clone(),
            })?;
        if slots[slot].is_some() {
            return Err(LayerError::RepeatedAttribute {
                layer: layer.to_string(),
                feature: index,
                field: field_name,
            });
        }
        let field_type = schema.fields()[slot].field_type;
        if !value.fits(field_type) {
            return Err(LayerError::TypeMismatch {
                layer: layer.to_string(),
                feature: index,
                field: field_name,
                expected: field_type,
                found: value.type_name(),
            });
        }
        slots[slot] = Some(value);
    }

    let attributes = schema
        .fields()
        .iter()
        .zip(slots)
        .map(|(field, slot)| {
            slot.map(|v| (field.name.clone(), v))
                .ok_or_else(|| LayerError::MissingField {
                    layer: layer.to_string(),
                    feature: index,
                    field: field.name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Feature {
        geometry: feature.geometry,
        attributes,
    })
}
