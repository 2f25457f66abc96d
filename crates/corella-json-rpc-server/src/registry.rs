//! Method registry and invocation capability.
//!
//! The engine consumes the registry through two narrow traits: resolve a
//! method name to its [`MethodDescriptor`] (plus structured type names to
//! their descriptors), and invoke a method with bound arguments. How the
//! schema is produced is the implementation's business; [`ServiceRegistry`]
//! is the in-memory one, populated before serving begins and safe for
//! concurrent reads afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::InvokeError;
use crate::schema::{MethodDescriptor, StructDescriptor, TypeRegistry};

/// Resolves structured type names used by the coercion grammar.
pub trait StructResolver: Send + Sync {
    fn resolve_struct(&self, name: &str) -> Option<Arc<StructDescriptor>>;
}

/// The external capability the dispatcher runs against.
#[async_trait]
pub trait MethodRegistry: StructResolver {
    /// Looks a method name up; `None` maps to a method-not-found response.
    fn resolve(&self, method: &str) -> Option<Arc<MethodDescriptor>>;

    /// Invokes a resolved method with arguments in declared order.
    async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value, InvokeError>;
}

/// One registered method implementation.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    async fn invoke(&self, args: Vec<Value>) -> Result<Value, InvokeError>;
}

/// Adapter turning an async closure into a [`MethodHandler`].
pub struct FunctionHandler<F> {
    handler_fn: F,
}

impl<F> FunctionHandler<F>
where
    F: Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, InvokeError>> + Send + Sync,
{
    pub fn new(handler_fn: F) -> Self {
        Self { handler_fn }
    }
}

#[async_trait]
impl<F> MethodHandler for FunctionHandler<F>
where
    F: Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, InvokeError>> + Send + Sync,
{
    async fn invoke(&self, args: Vec<Value>) -> Result<Value, InvokeError> {
        (self.handler_fn)(args).await
    }
}

struct RegisteredMethod {
    descriptor: Arc<MethodDescriptor>,
    handler: Arc<dyn MethodHandler>,
}

/// HashMap-backed registry of methods and structured types.
#[derive(Default)]
pub struct ServiceRegistry {
    methods: HashMap<String, RegisteredMethod>,
    types: TypeRegistry,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method under a name with its schema and implementation.
    pub fn register_method<H>(
        &mut self,
        method: impl Into<String>,
        descriptor: MethodDescriptor,
        handler: H,
    ) where
        H: MethodHandler + 'static,
    {
        self.methods.insert(
            method.into(),
            RegisteredMethod {
                descriptor: Arc::new(descriptor),
                handler: Arc::new(handler),
            },
        );
    }

    /// Registers an async closure as a method implementation.
    pub fn register_fn<F>(
        &mut self,
        method: impl Into<String>,
        descriptor: MethodDescriptor,
        handler_fn: F,
    ) where
        F: Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, InvokeError>>
            + Send
            + Sync
            + 'static,
    {
        self.register_method(method, descriptor, FunctionHandler::new(handler_fn));
    }

    /// Registers a structured type for the coercion grammar.
    pub fn register_struct(&mut self, descriptor: StructDescriptor) {
        self.types.register(descriptor);
    }

    pub fn registered_methods(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }
}

impl StructResolver for ServiceRegistry {
    fn resolve_struct(&self, name: &str) -> Option<Arc<StructDescriptor>> {
        self.types.resolve_struct(name)
    }
}

#[async_trait]
impl MethodRegistry for ServiceRegistry {
    fn resolve(&self, method: &str) -> Option<Arc<MethodDescriptor>> {
        self.methods
            .get(method)
            .map(|registered| registered.descriptor.clone())
    }

    async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value, InvokeError> {
        let registered = self
            .methods
            .get(method)
            .ok_or_else(|| InvokeError::internal(format!("method '{}' is not registered", method)))?;
        registered.handler.invoke(args).await
    }
}
