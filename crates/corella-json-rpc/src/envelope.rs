//! Request envelope validation.
//!
//! A decoded body is first split into a [`Payload`] (single vs. batch), then
//! each element is validated into an [`Envelope`]. Both steps report failures
//! as ready-to-serialize [`ErrorResponse`]s so the dispatcher can forward them
//! unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorResponse;
use crate::types::RequestId;

/// The `params` member: positional array or named object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Positional parameters, consumed in declaration order
    Array(Vec<Value>),
    /// Named parameters, matched by parameter name
    Object(HashMap<String, Value>),
}

impl RequestParams {
    /// An empty positional list; absent `params` normalizes to this.
    pub fn empty() -> Self {
        RequestParams::Array(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RequestParams::Array(items) => items.is_empty(),
            RequestParams::Object(map) => map.is_empty(),
        }
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(items: Vec<Value>) -> Self {
        RequestParams::Array(items)
    }
}

impl From<HashMap<String, Value>> for RequestParams {
    fn from(map: HashMap<String, Value>) -> Self {
        RequestParams::Object(map)
    }
}

/// A decoded request body: one envelope or an ordered batch of them.
#[derive(Debug, Clone)]
pub enum Payload {
    Single(Value),
    Batch(Vec<Value>),
}

impl Payload {
    /// Classifies a decoded body.
    ///
    /// `None` means the transport failed to decode JSON at all; together with
    /// a body that decoded to nothing but `null`, it maps to a parse error.
    /// A batch is any JSON array; an empty batch is itself an invalid request
    /// (reported as a single error response, not an empty response set).
    pub fn from_body(body: Option<Value>) -> Result<Payload, ErrorResponse> {
        match body {
            None | Some(Value::Null) => Err(ErrorResponse::parse_error()),
            Some(Value::Array(items)) => {
                if items.is_empty() {
                    Err(ErrorResponse::invalid_request(None))
                } else {
                    Ok(Payload::Batch(items))
                }
            }
            Some(value) => Ok(Payload::Single(value)),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Payload::Batch(_))
    }
}

/// A validated JSON-RPC 2.0 request envelope.
///
/// An absent (or `null`) id makes the envelope a notification: the caller
/// does not expect a response.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub method: String,
    pub params: RequestParams,
    pub id: Option<RequestId>,
}

impl Envelope {
    /// Validates one decoded value against the JSON-RPC 2.0 envelope rules.
    ///
    /// The value must be an object carrying the exact `"2.0"` version literal
    /// and a non-empty string `method`. With the light addressing protocol the
    /// method name may instead arrive as `method_hint` (taken from the
    /// transport path); if both are present they must agree.
    ///
    /// Failures here are never correlated to an id: the envelope could not be
    /// trusted enough to read one.
    pub fn parse(value: &Value, method_hint: Option<&str>) -> Result<Envelope, ErrorResponse> {
        // a null element decoded to nothing, which is worse than a wrong shape
        if value.is_null() {
            return Err(ErrorResponse::parse_error());
        }
        let object = value
            .as_object()
            .ok_or_else(|| ErrorResponse::invalid_request(None))?;

        let version_ok = object
            .get("jsonrpc")
            .and_then(Value::as_str)
            .is_some_and(|v| v == crate::JSONRPC_VERSION);
        if !version_ok {
            return Err(ErrorResponse::invalid_request(None));
        }

        let body_method = object
            .get("method")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty());
        let hint = method_hint.filter(|h| !h.is_empty());
        let method = match (body_method, hint) {
            (Some(body), Some(hint)) if body != hint => {
                return Err(ErrorResponse::invalid_request(Some(
                    "Invalid Request: method mismatch".to_string(),
                )));
            }
            (Some(body), _) => body.to_string(),
            (None, Some(hint)) => hint.to_string(),
            (None, None) => return Err(ErrorResponse::invalid_request(None)),
        };

        let id = RequestId::from_value(object.get("id"))
            .map_err(|_| ErrorResponse::invalid_request(None))?;

        let params = match object.get("params") {
            None | Some(Value::Null) => RequestParams::empty(),
            Some(Value::Array(items)) => RequestParams::Array(items.clone()),
            Some(Value::Object(map)) => {
                RequestParams::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
            Some(_) => return Err(ErrorResponse::invalid_request(None)),
        };

        Ok(Envelope { method, params, id })
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}
