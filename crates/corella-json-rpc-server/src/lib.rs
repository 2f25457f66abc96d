//! # JSON-RPC 2.0 Dispatch Engine
//!
//! A schema-driven request-processing engine on top of
//! [`corella_json_rpc`]: it accepts single or batched envelopes, resolves
//! each to a registered method, coerces loosely-typed JSON parameters into
//! the method's declared argument types, invokes the method and produces
//! spec-compliant responses, including batch and notification semantics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use corella_json_rpc_server::{Dispatcher, ServiceRegistry};
//! use corella_json_rpc_server::schema::{MethodDescriptor, ParamDescriptor};
//! use futures::future::FutureExt;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let mut registry = ServiceRegistry::new();
//! registry.register_fn(
//!     "echo",
//!     MethodDescriptor::new()
//!         .with_param(ParamDescriptor::new("text", "string").required())
//!         .with_returns(ParamDescriptor::new("result", "string")),
//!     |mut args| async move { Ok(args.remove(0)) }.boxed(),
//! );
//!
//! let dispatcher = Dispatcher::new(Arc::new(registry));
//! let body = json!({"jsonrpc": "2.0", "method": "echo", "params": {"text": "hi"}, "id": 1});
//! let response = dispatcher.dispatch(Some(body), None).await;
//! assert_eq!(response, Some(json!({"jsonrpc": "2.0", "id": 1, "result": "hi"})));
//! # }
//! ```

pub mod bind;
pub mod coerce;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod schema;
pub mod validate;

pub mod prelude;

pub use bind::bind;
pub use dispatch::{Dispatcher, DispatcherBuilder};
pub use error::{FaultContext, InvokeError, RpcError};
pub use registry::{FunctionHandler, MethodHandler, MethodRegistry, ServiceRegistry, StructResolver};
pub use schema::{MethodDescriptor, ParamDescriptor, StructDescriptor, TypeRegistry};

// Protocol layer re-export for embedders that only depend on this crate
pub use corella_json_rpc as protocol;
