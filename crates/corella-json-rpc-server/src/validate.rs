//! Declarative constraints, applied to coerced values.
//!
//! Each rule is independent: required/non-null, an enumerated allowed set
//! for scalar kinds, and inclusive min/max size bounds whose meaning follows
//! the coerced kind (character length, element count, or the numeric value).

use serde_json::{Value, json};

use crate::error::{FaultContext, RpcError};
use crate::schema::ParamDescriptor;

/// Checks every constraint the descriptor declares for an already-coerced
/// value. The first violated rule fails with structured error data naming
/// the field, the received value, the rule and the declared bound.
pub fn validate_value(
    value: &Value,
    descriptor: &ParamDescriptor,
    ctx: FaultContext,
) -> Result<(), RpcError> {
    if descriptor.required && value.is_null() {
        return Err(RpcError::constraint(
            ctx,
            format!("{} is required and cannot be null", descriptor.name),
            &descriptor.name,
            value,
            "notNull",
            Value::Null,
        ));
    }

    if !descriptor.restrictions.is_empty()
        && matches!(value, Value::String(_) | Value::Number(_))
        && !descriptor.restrictions.iter().any(|r| loose_eq(r, value))
    {
        let allowed = descriptor
            .restrictions
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join("','");
        return Err(RpcError::constraint(
            ctx,
            format!(
                "Value '{}' is not allowed for {}. Allowed values is '{}'",
                render(value),
                descriptor.name,
                allowed
            ),
            &descriptor.name,
            value,
            "inArray",
            Value::Array(descriptor.restrictions.clone()),
        ));
    }

    if let Some(min) = descriptor.min_size {
        let violated = match size_of(value) {
            Some(size) => size < min,
            // a lower bound on an absent value is unsatisfiable
            None => value.is_null() && min > 0.0,
        };
        if violated {
            return Err(RpcError::constraint(
                ctx,
                format!("For {} allowed min size is {}", descriptor.name, min),
                &descriptor.name,
                value,
                "minSize",
                json!(min),
            ));
        }
    }

    if let Some(max) = descriptor.max_size {
        if size_of(value).is_some_and(|size| size > max) {
            return Err(RpcError::constraint(
                ctx,
                format!("For {} allowed max size is {}", descriptor.name, max),
                &descriptor.name,
                value,
                "maxSize",
                json!(max),
            ));
        }
    }

    Ok(())
}

/// Size under the min/max rules: character length for strings, element count
/// for arrays, the value itself for numbers. Other kinds have no size.
fn size_of(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

// Membership is loose across numeric representations: a declared `2` admits
// a coerced `2.0`.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
