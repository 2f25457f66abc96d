//! # JSON-RPC 2.0 Protocol Layer
//!
//! Transport-agnostic JSON-RPC 2.0 envelope types and validation. This crate
//! covers the wire format only: request/notification envelopes, success and
//! error responses, batch payload handling and the canonical error taxonomy.
//! It consumes an already-decoded `serde_json::Value` and never touches the
//! transport.
//!
//! ## Features
//! - Full JSON-RPC 2.0 envelope validation (version tag, method, id rules)
//! - Batch payloads with the empty-batch protocol error
//! - "Light" method addressing: the method name may come from the transport
//!   path instead of the request body
//! - Canonical error codes with structured, machine-readable error data

pub mod envelope;
pub mod error;
pub mod response;
pub mod types;

pub mod prelude;

pub use envelope::{Envelope, Payload, RequestParams};
pub use error::{ErrorCode, ErrorObject, ErrorResponse};
pub use response::{Response, ResponseMessage};
pub use types::{RequestId, Version};

/// JSON-RPC 2.0 version literal
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Application error range reserved for method-level business errors
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
