//! Parameter binding.
//!
//! Walks a method descriptor and the raw params container, producing the
//! coerced argument list in declaration order. Positional arrays are first
//! zipped against the declared order into a named map, so both calling
//! conventions bind through the same path.

use std::collections::HashMap;

use serde_json::{Value, json};

use crate::coerce::coerce_param;
use crate::error::{FaultContext, RpcError};
use crate::registry::StructResolver;
use crate::schema::{MethodDescriptor, TypeDescriptor};

use corella_json_rpc::RequestParams;

/// Binds raw params to the method's declared parameters.
///
/// - a scalar supplied for a list-typed parameter is wrapped into a
///   one-element list; an array supplied for a scalar-typed parameter is
///   rejected
/// - absent parameters take their declared default untouched, or accumulate
///   into a missing list reported in one failure after the full scan
/// - keys not matching any declared parameter are ignored
pub fn bind(
    method: &MethodDescriptor,
    params: &RequestParams,
    types: &dyn StructResolver,
) -> Result<Vec<Value>, RpcError> {
    let named: HashMap<&str, &Value> = match params {
        RequestParams::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        RequestParams::Array(items) => method
            .params
            .iter()
            .zip(items.iter())
            .map(|(param, value)| (param.name.as_str(), value))
            .collect(),
    };

    let mut args = Vec::with_capacity(method.params.len());
    let mut missing = Vec::new();
    for param in &method.params {
        let Some(&value) = named.get(param.name.as_str()) else {
            match &param.default {
                Some(default) => args.push(default.clone()),
                None => missing.push(param.name.clone()),
            }
            continue;
        };

        let is_list = TypeDescriptor::parse(&param.type_descriptor)?.is_list;
        let value = if is_list && !value.is_array() {
            Value::Array(vec![value.clone()])
        } else if !is_list && value.is_array() {
            return Err(RpcError::invalid_request(
                format!("Invalid data received for parameter \"{}\"", param.name),
                None,
            ));
        } else {
            value.clone()
        };

        args.push(coerce_param(value, param, FaultContext::Inbound, types)?);
    }

    if !missing.is_empty() {
        return Err(RpcError::invalid_request(
            format!("Missing required parameters: {}", missing.join(", ")),
            Some(json!({ "missing": missing })),
        ));
    }

    Ok(args)
}
