//! Batch dispatch.
//!
//! Orchestrates the per-envelope pipeline: envelope validation, method
//! resolution, parameter binding, invocation, result coercion and response
//! assembly. Failures are caught at the envelope boundary and become error
//! responses; nothing aborts the rest of a batch.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, error, warn};

use corella_json_rpc::{Envelope, ErrorCode, ErrorResponse, Payload, ResponseMessage};

use crate::bind::bind;
use crate::coerce::coerce_param;
use crate::error::{FaultContext, InvokeError, RpcError};
use crate::registry::{MethodRegistry, StructResolver};

/// The request-processing engine.
///
/// Stateless across calls: concurrent dispatches share nothing but the
/// read-only registry.
pub struct Dispatcher {
    registry: Arc<dyn MethodRegistry>,
    void_result: Value,
    validate_results: bool,
}

impl Dispatcher {
    /// A dispatcher with the default policies: results are validated against
    /// the return descriptor, and void methods answer `{"success": true}`.
    pub fn new(registry: Arc<dyn MethodRegistry>) -> Self {
        Self::builder(registry).build()
    }

    pub fn builder(registry: Arc<dyn MethodRegistry>) -> DispatcherBuilder {
        DispatcherBuilder::new(registry)
    }

    /// Processes one decoded request body and returns the value to
    /// serialize, or `None` when no body should be written (notifications).
    ///
    /// `body` is `None` when the transport could not decode JSON at all.
    /// `method_hint` carries a method name taken from the transport path
    /// (light addressing); body and hint must agree when both are present.
    pub async fn dispatch(&self, body: Option<Value>, method_hint: Option<&str>) -> Option<Value> {
        let payload = match Payload::from_body(body) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(code = err.error.code, "rejected request payload");
                return serde_json::to_value(ResponseMessage::Error(err)).ok();
            }
        };

        match payload {
            Payload::Single(value) => {
                let response = self.respond_to(&value, method_hint).await?;
                serde_json::to_value(response).ok()
            }
            Payload::Batch(items) => {
                debug!(envelopes = items.len(), "dispatching batch");
                let mut responses = Vec::new();
                for item in &items {
                    if let Some(response) = self.respond_to(item, method_hint).await {
                        responses.push(response);
                    }
                }
                if responses.is_empty() {
                    None
                } else {
                    serde_json::to_value(responses).ok()
                }
            }
        }
    }

    /// Runs one envelope and decides whether it gets a response.
    async fn respond_to(&self, raw: &Value, method_hint: Option<&str>) -> Option<ResponseMessage> {
        let envelope = match Envelope::parse(raw, method_hint) {
            Ok(envelope) => envelope,
            Err(err) => {
                // Envelope-level defects always produce a response: the
                // client cannot be told apart from a notification sender.
                warn!(code = err.error.code, "invalid request envelope");
                return Some(ResponseMessage::Error(err));
            }
        };

        let id = envelope.id.clone();
        match self.run(&envelope).await {
            Ok(result) => id.map(|id| ResponseMessage::success(id, result)),
            Err(err) => {
                if err.code == ErrorCode::InternalError {
                    error!(method = %envelope.method, %err, "request failed");
                } else {
                    debug!(method = %envelope.method, %err, "request failed");
                }
                let suppress = id.is_none()
                    && !matches!(err.code, ErrorCode::ParseError | ErrorCode::InvalidRequest);
                if suppress {
                    None
                } else {
                    Some(ResponseMessage::Error(ErrorResponse::new(
                        id,
                        err.to_error_object(),
                    )))
                }
            }
        }
    }

    /// The per-envelope pipeline after envelope validation.
    async fn run(&self, envelope: &Envelope) -> Result<Value, RpcError> {
        let descriptor = self.registry.resolve(&envelope.method).ok_or_else(|| {
            warn!(method = %envelope.method, "method not found");
            RpcError::method_not_found(&envelope.method)
        })?;

        let resolver: &dyn StructResolver = self.registry.as_ref();

        // By now the envelope is well formed; whatever binding finds wrong
        // is a defect in the argument values.
        let args =
            bind(&descriptor, &envelope.params, resolver).map_err(RpcError::into_params_fault)?;

        let result = match self.registry.invoke(&envelope.method, args).await {
            Ok(result) => result,
            Err(InvokeError::Application {
                code,
                message,
                data,
            }) => return Err(RpcError::new(ErrorCode::Application(code), message, data)),
            Err(InvokeError::Internal(detail)) => {
                // Unexpected failures never leak diagnostic detail.
                error!(method = %envelope.method, error = %detail, "method invocation failed");
                return Err(RpcError::new(
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.message(),
                    None,
                ));
            }
        };

        let result = match &descriptor.returns {
            Some(returns) if self.validate_results => {
                coerce_param(result, returns, FaultContext::SchemaOwned, resolver)?
            }
            _ => result,
        };

        // Void methods answer with the configured success payload.
        if result.is_null() {
            Ok(self.void_result.clone())
        } else {
            Ok(result)
        }
    }
}

/// Builder for the dispatcher's policies.
pub struct DispatcherBuilder {
    registry: Arc<dyn MethodRegistry>,
    void_result: Value,
    validate_results: bool,
}

impl DispatcherBuilder {
    fn new(registry: Arc<dyn MethodRegistry>) -> Self {
        Self {
            registry,
            void_result: json!({"success": true}),
            validate_results: true,
        }
    }

    /// Payload answered by methods that return nothing.
    pub fn void_result(mut self, value: Value) -> Self {
        self.void_result = value;
        self
    }

    /// Whether results are coerced and validated against the method's
    /// return descriptor.
    pub fn validate_results(mut self, enabled: bool) -> Self {
        self.validate_results = enabled;
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            registry: self.registry,
            void_result: self.void_result,
            validate_results: self.validate_results,
        }
    }
}
