use serde_json::Value;
use thiserror::Error;

use corella_json_rpc::{ErrorCode, ErrorObject};

/// Who owns the value currently being coerced or validated.
///
/// Inbound parameters are the client's fault when they fail; values owned by
/// a structured type (or a method's return value) are a schema-authoring
/// contract and surface as internal errors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultContext {
    Inbound,
    SchemaOwned,
}

impl FaultContext {
    pub fn code(self) -> ErrorCode {
        match self {
            FaultContext::Inbound => ErrorCode::InvalidParams,
            FaultContext::SchemaOwned => ErrorCode::InternalError,
        }
    }
}

/// An engine failure, carrying the taxonomy kind, a stable message and the
/// optional structured data payload that ends up in the response `error`.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct RpcError {
    pub code: ErrorCode,
    pub message: String,
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method not found: {}", method),
            None,
        )
    }

    pub fn invalid_request(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message, data)
    }

    pub fn invalid_params(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(ErrorCode::InvalidParams, message, data)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message, None)
    }

    /// A constraint failure in the given fault context. The structured data
    /// names the offending field, its value, the violated rule and the
    /// declared bound.
    pub fn constraint(
        ctx: FaultContext,
        message: impl Into<String>,
        cause: &str,
        value: &Value,
        kind: &str,
        restriction: Value,
    ) -> Self {
        Self::new(
            ctx.code(),
            message,
            Some(ErrorObject::constraint_data(cause, value, kind, restriction)),
        )
    }

    /// Remaps an invalid-request-shaped failure to invalid params.
    ///
    /// Once the envelope itself has been validated, any defect discovered
    /// while binding arguments belongs to the params, whatever it looked like
    /// internally.
    pub fn into_params_fault(self) -> Self {
        if self.code == ErrorCode::InvalidRequest {
            Self::new(ErrorCode::InvalidParams, self.message, self.data)
        } else {
            self
        }
    }

    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject::new(self.code, Some(self.message.clone()), self.data.clone())
    }
}

/// Failure modes of the opaque method-invocation capability.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// A business error from the method itself: an application-reserved code
    /// passed through to the client unchanged.
    #[error("application error {code}: {message}")]
    Application {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// Anything unexpected. The message is logged server-side and never
    /// reaches the client.
    #[error("{0}")]
    Internal(String),
}

impl InvokeError {
    pub fn application(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        InvokeError::Application {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        InvokeError::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fault_context_codes() {
        assert_eq!(FaultContext::Inbound.code(), ErrorCode::InvalidParams);
        assert_eq!(FaultContext::SchemaOwned.code(), ErrorCode::InternalError);
    }

    #[test]
    fn test_params_fault_remap() {
        let err = RpcError::invalid_request("Missing required parameters: b", None);
        let remapped = err.into_params_fault();
        assert_eq!(remapped.code, ErrorCode::InvalidParams);
        assert_eq!(remapped.message, "Missing required parameters: b");

        let err = RpcError::method_not_found("x").into_params_fault();
        assert_eq!(err.code, ErrorCode::MethodNotFound);
    }

    #[test]
    fn test_constraint_error_data() {
        let err = RpcError::constraint(
            FaultContext::Inbound,
            "For count allowed max size is 5",
            "count",
            &json!(9),
            "maxSize",
            json!(5.0),
        );
        let object = err.to_error_object();
        assert_eq!(object.code, -32602);
        let data = object.data.unwrap();
        assert_eq!(data["cause"], "count");
        assert_eq!(data["value"], 9);
        assert_eq!(data["type"], "maxSize");
    }
}
