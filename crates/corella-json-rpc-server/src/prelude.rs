//! Convenient re-exports of the most commonly used engine types.
//!
//! ```rust
//! use corella_json_rpc_server::prelude::*;
//! ```

pub use crate::bind::bind;
pub use crate::coerce::{coerce_param, coerce_value};
pub use crate::dispatch::{Dispatcher, DispatcherBuilder};
pub use crate::error::{FaultContext, InvokeError, RpcError};
pub use crate::registry::{
    FunctionHandler, MethodHandler, MethodRegistry, ServiceRegistry, StructResolver,
};
pub use crate::schema::{
    BaseType, MethodDescriptor, ParamDescriptor, StructDescriptor, TypeDescriptor, TypeRegistry,
};
pub use crate::validate::validate_value;

pub use corella_json_rpc::prelude::*;
