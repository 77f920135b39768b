//! Coercion of raw field values to their header-declared types.
//!
//! Every INFO and FORMAT value travels through here exactly once. The rules
//! are fail-fast: a value that cannot satisfy its declaration aborts the
//! stream, with two deliberate exceptions for Float fields, where `.` and
//! non-finite results coerce to null so every emitted document stays
//! JSON-representable.

use serde_json::Value;

use crate::document::float_value;
use crate::error::{Result, VarflatError};
use crate::types::{FieldDef, FieldType};

/// Coerce a raw value according to its header declaration.
///
/// Flag-typed fields coerce to `true` regardless of the raw text (presence
/// is the value). Multi-valued fields split on `,` and coerce each element
/// independently, preserving source order.
///
/// # Errors
///
/// Returns [`VarflatError::CoercionError`] when a value cannot be parsed as
/// its declared type.
pub fn coerce(raw: &str, def: &FieldDef) -> Result<Value> {
    if def.field_type == FieldType::Flag {
        return Ok(Value::Bool(true));
    }
    if def.is_multi_valued() {
        coerce_list(raw, def.field_type, &def.id)
    } else {
        coerce_scalar(raw, def.field_type, &def.id)
    }
}

/// Coerce a single raw element to a scalar JSON value.
///
/// # Errors
///
/// Returns [`VarflatError::CoercionError`] on an Integer parse failure, or a
/// Float value that is neither `.` nor parseable.
pub fn coerce_scalar(raw: &str, ty: FieldType, field: &str) -> Result<Value> {
    match ty {
        FieldType::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| coercion_error(field, ty, raw)),
        FieldType::Float => {
            // A bare `.` is the VCF missing-value marker; non-finite parse
            // results have no JSON representation. Both become null.
            if raw == "." {
                return Ok(Value::Null);
            }
            let parsed: f64 = raw.parse().map_err(|_| coercion_error(field, ty, raw))?;
            Ok(float_value(parsed))
        }
        FieldType::String => Ok(Value::String(raw.to_string())),
        FieldType::Flag => Ok(Value::Bool(true)),
    }
}

/// Coerce a comma-separated raw value into an ordered array.
///
/// A `.` element in a Float list yields null at that position without
/// failing the rest of the list.
///
/// # Errors
///
/// Returns [`VarflatError::CoercionError`] when any element fails its
/// scalar coercion.
pub fn coerce_list(raw: &str, ty: FieldType, field: &str) -> Result<Value> {
    let mut elements = Vec::new();
    for part in raw.split(',') {
        elements.push(coerce_scalar(part, ty, field)?);
    }
    Ok(Value::Array(elements))
}

fn coercion_error(field: &str, ty: FieldType, value: &str) -> VarflatError {
    VarflatError::CoercionError {
        field: field.to_string(),
        ty: ty.to_string(),
        value: value.to_string(),
    }
}
