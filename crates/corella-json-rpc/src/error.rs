use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::types::{RequestId, Version};

/// Canonical JSON-RPC error kinds and their numeric codes.
///
/// `Application` covers the method-level business-error band; those codes are
/// passed through from the invocation layer unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    Application(i64),
}

impl ErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            ErrorCode::ParseError => crate::error_codes::PARSE_ERROR,
            ErrorCode::InvalidRequest => crate::error_codes::INVALID_REQUEST,
            ErrorCode::MethodNotFound => crate::error_codes::METHOD_NOT_FOUND,
            ErrorCode::InvalidParams => crate::error_codes::INVALID_PARAMS,
            ErrorCode::InternalError => crate::error_codes::INTERNAL_ERROR,
            ErrorCode::Application(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::Application(_) => "Server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// The `error` member of an error response: `{code, message, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    pub fn new(code: ErrorCode, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, None, None)
    }

    pub fn invalid_request(message: Option<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message, None)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            Some(format!("Method not found: {}", method)),
            None,
        )
    }

    pub fn invalid_params(message: &str, data: Option<Value>) -> Self {
        Self::new(ErrorCode::InvalidParams, Some(message.to_string()), data)
    }

    pub fn internal_error(message: Option<String>) -> Self {
        Self::new(ErrorCode::InternalError, message, None)
    }

    /// An application-band error from the invocation layer, passed through
    /// with its code, message and data untouched.
    pub fn application(code: i64, message: &str, data: Option<Value>) -> Self {
        Self::new(ErrorCode::Application(code), Some(message.to_string()), data)
    }

    /// Structured data attached to every constraint failure. Identifies the
    /// offending field, its received value, the violated rule and the rule's
    /// declared bound.
    pub fn constraint_data(cause: &str, value: &Value, kind: &str, restriction: Value) -> Value {
        json!({
            "cause": cause,
            "value": value,
            "type": kind,
            "restriction": restriction,
        })
    }
}

/// A complete JSON-RPC error response envelope.
///
/// The id is `None` when the failure happened before the request could be
/// correlated; it serializes as `null` in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "jsonrpc")]
    pub version: Version,
    pub id: Option<RequestId>,
    pub error: ErrorObject,
}

impl ErrorResponse {
    pub fn new(id: Option<RequestId>, error: ErrorObject) -> Self {
        Self {
            version: Version::V2,
            id,
            error,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(None, ErrorObject::parse_error())
    }

    pub fn invalid_request(message: Option<String>) -> Self {
        Self::new(None, ErrorObject::invalid_request(message))
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSON-RPC error {}: {}",
            self.error.code, self.error.message
        )
    }
}

impl std::error::Error for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::ParseError.code(), -32700);
        assert_eq!(ErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(ErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(ErrorCode::InvalidParams.code(), -32602);
        assert_eq!(ErrorCode::InternalError.code(), -32603);
        assert_eq!(ErrorCode::Application(-32004).code(), -32004);
    }

    #[test]
    fn test_uncorrelated_error_id_serializes_as_null() {
        let err = ErrorResponse::parse_error();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("id").unwrap().is_null());
        assert_eq!(json["error"]["code"], -32700);
    }

    #[test]
    fn test_data_omitted_when_absent() {
        let err = ErrorObject::method_not_found("frob");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("\"data\""));
        assert!(json.contains("Method not found: frob"));
    }

    #[test]
    fn test_constraint_data_shape() {
        let data = ErrorObject::constraint_data(
            "mode",
            &Value::String("c".to_string()),
            "inArray",
            serde_json::json!(["a", "b"]),
        );
        assert_eq!(data["cause"], "mode");
        assert_eq!(data["value"], "c");
        assert_eq!(data["type"], "inArray");
        assert_eq!(data["restriction"], serde_json::json!(["a", "b"]));
    }
}
