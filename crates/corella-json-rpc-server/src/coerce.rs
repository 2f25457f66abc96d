//! Recursive value coercion.
//!
//! Converts arbitrary decoded JSON into a value of a declared type. Scalar
//! coercion is deliberately permissive, mirroring weak-typing conversion at
//! the boundary: numeric-looking strings truncate into ints, scalars have a
//! truthiness, and no representable conversion ever fails. Structural
//! mismatches (non-array where a list is declared, non-object where a
//! structured type is declared) and schema defects do fail, through the
//! caller's [`FaultContext`].

use serde_json::{Map, Value};

use crate::error::{FaultContext, RpcError};
use crate::registry::StructResolver;
use crate::schema::{BaseType, ParamDescriptor, TypeDescriptor};
use crate::validate::validate_value;

/// Recursion guard for mutually-recursive structured types.
const MAX_DEPTH: usize = 32;

/// Coerces and validates one value against its full descriptor.
pub fn coerce_param(
    value: Value,
    descriptor: &ParamDescriptor,
    ctx: FaultContext,
    types: &dyn StructResolver,
) -> Result<Value, RpcError> {
    let coerced = coerce_value(value, &descriptor.type_descriptor, ctx, types, 0)?;
    validate_value(&coerced, descriptor, ctx)?;
    Ok(coerced)
}

/// Coerces a value against a raw type annotation, without constraints.
pub fn coerce_value(
    value: Value,
    annotation: &str,
    ctx: FaultContext,
    types: &dyn StructResolver,
    depth: usize,
) -> Result<Value, RpcError> {
    if depth > MAX_DEPTH {
        return Err(RpcError::internal(format!(
            "type '{}' exceeds the recursion limit",
            annotation
        )));
    }
    // Null always passes through; constraints decide whether it is allowed.
    if value.is_null() {
        return Ok(Value::Null);
    }

    let descriptor = TypeDescriptor::parse(annotation)?;
    if descriptor.is_list {
        let Value::Array(items) = value else {
            return Err(RpcError::new(
                ctx.code(),
                format!("value has type {}, but array expected", json_kind(&value)),
                None,
            ));
        };
        let coerced = items
            .into_iter()
            .map(|item| coerce_base(item, &descriptor.base, ctx, types, depth + 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(coerced))
    } else {
        coerce_base(value, &descriptor.base, ctx, types, depth)
    }
}

fn coerce_base(
    value: Value,
    base: &BaseType,
    ctx: FaultContext,
    types: &dyn StructResolver,
    depth: usize,
) -> Result<Value, RpcError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let BaseType::Named(name) = base else {
        return Ok(coerce_scalar(base, value));
    };

    // Structured types must be registered; a schema referencing anything
    // else is itself defective.
    let descriptor = types.resolve_struct(name).ok_or_else(|| {
        RpcError::internal(format!("'{}' is not a registered structured type", name))
    })?;
    let Value::Object(map) = value else {
        return Err(RpcError::new(
            ctx.code(),
            format!(
                "value for '{}' has type {}, but object expected",
                name,
                json_kind(&value)
            ),
            None,
        ));
    };

    let mut fields = Map::new();
    for field in &descriptor.fields {
        let raw = match map.get(&field.name) {
            Some(sub) => sub.clone(),
            None => field.default.clone().unwrap_or(Value::Null),
        };
        // Field constraints are the schema author's contract, not client input.
        let coerced = coerce_value(
            raw,
            &field.type_descriptor,
            FaultContext::SchemaOwned,
            types,
            depth + 1,
        )?;
        validate_value(&coerced, field, FaultContext::SchemaOwned)?;
        fields.insert(field.name.clone(), coerced);
    }
    Ok(Value::Object(fields))
}

fn coerce_scalar(base: &BaseType, value: Value) -> Value {
    match base {
        BaseType::String => Value::String(lexical_string(&value)),
        BaseType::Int => Value::from(to_int(&value)),
        BaseType::Float => Value::from(to_float(&value)),
        BaseType::Bool => Value::Bool(truthiness(&value)),
        BaseType::Named(_) => value,
    }
}

fn lexical_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // composites collapse to the scalar zero
        Value::Array(_) | Value::Object(_) => "0".to_string(),
        Value::Null => String::new(),
    }
}

fn to_int(value: &Value) -> i64 {
    // integral numbers keep full precision, everything else truncates
    if let Value::Number(n) = value
        && let Some(i) = n.as_i64()
    {
        return i;
    }
    to_float(value) as i64
}

fn to_float(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => numeric_prefix(s),
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        Value::Array(_) | Value::Object(_) | Value::Null => 0.0,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}

fn truthiness(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(_) | Value::Object(_) | Value::Null => false,
    }
}

/// The longest numeric prefix of a string, `0.0` when there is none.
fn numeric_prefix(s: &str) -> f64 {
    let s = s.trim();
    let mut parsed = 0.0;
    let boundaries = s
        .char_indices()
        .map(|(i, _)| i)
        .skip(1)
        .chain(std::iter::once(s.len()));
    for end in boundaries {
        if let Ok(v) = s[..end].parse::<f64>() {
            if v.is_finite() {
                parsed = v;
            }
        }
    }
    parsed
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
