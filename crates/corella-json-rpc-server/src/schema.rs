//! Method and type schema model.
//!
//! A method's parameters and return value are declared as
//! [`ParamDescriptor`]s whose types use a compact string grammar: a base type
//! (`string`, `int`, `float`, `bool`, or the name of a registered structured
//! type) optionally followed by `[]` for a list. How descriptors get produced
//! is the registry's business; the engine only reads them.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;
use crate::registry::StructResolver;

/// The scalar-or-named half of the type grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    String,
    Int,
    Float,
    Bool,
    /// A structured type, resolved by name through the [`TypeRegistry`]
    Named(String),
}

/// A parsed type annotation: `T` or `T[]`.
///
/// Exactly one level of list nesting exists by construction; a descriptor
/// with more markers is a defect in the schema, not in client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub base: BaseType,
    pub is_list: bool,
}

impl TypeDescriptor {
    /// Parses the annotation grammar.
    ///
    /// Rejects (as internal errors) empty annotations, more than one `[]`
    /// marker, and the deprecated bare `array` type.
    pub fn parse(annotation: &str) -> Result<TypeDescriptor, RpcError> {
        let annotation = annotation.trim();
        let (name, is_list) = match annotation.strip_suffix("[]") {
            Some(base) => (base, true),
            None => (annotation, false),
        };

        if name.is_empty() || name.contains("[]") {
            return Err(RpcError::internal(format!(
                "type '{}' is invalid",
                annotation
            )));
        }

        let base = match name {
            "string" => BaseType::String,
            "int" => BaseType::Int,
            "float" | "double" => BaseType::Float,
            "bool" => BaseType::Bool,
            "array" => {
                return Err(RpcError::internal(
                    "parameter type 'array' is deprecated, use square brackets \
                     or a structured type instead",
                ));
            }
            other => BaseType::Named(other.to_string()),
        };

        Ok(TypeDescriptor { base, is_list })
    }
}

/// Declaration of one parameter, struct field or return value.
///
/// Serializable, so schemas can be declared statically or loaded from
/// configuration just as well as built in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDescriptor {
    pub name: String,
    /// Raw type annotation, `T` or `T[]`
    #[serde(rename = "type")]
    pub type_descriptor: String,
    /// Required values reject null after coercion
    #[serde(default)]
    pub required: bool,
    /// Enumerated allowed values; empty means unrestricted
    #[serde(default)]
    pub restrictions: Vec<Value>,
    #[serde(default)]
    pub min_size: Option<f64>,
    #[serde(default)]
    pub max_size: Option<f64>,
    /// Used verbatim when the parameter is absent from the request
    #[serde(default)]
    pub default: Option<Value>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, type_descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_descriptor: type_descriptor.into(),
            required: false,
            restrictions: Vec::new(),
            min_size: None,
            max_size: None,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_restrictions(mut self, restrictions: Vec<Value>) -> Self {
        self.restrictions = restrictions;
        self
    }

    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = Some(min_size);
        self
    }

    pub fn with_max_size(mut self, max_size: f64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Schema of one method: ordered parameters and an optional return shape.
///
/// Produced by the registry at resolution time and immutable for the
/// duration of one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDescriptor {
    pub params: Vec<ParamDescriptor>,
    pub returns: Option<ParamDescriptor>,
}

impl MethodDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_returns(mut self, returns: ParamDescriptor) -> Self {
        self.returns = Some(returns);
        self
    }
}

/// A named record type with field-level descriptors, usable anywhere the
/// type grammar accepts a base type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDescriptor {
    pub name: String,
    pub fields: Vec<ParamDescriptor>,
}

impl StructDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: ParamDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

/// Registration-time table mapping structured type names to their
/// descriptors. Populated before serving begins; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<StructDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: StructDescriptor) {
        self.types
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl StructResolver for TypeRegistry {
    fn resolve_struct(&self, name: &str) -> Option<Arc<StructDescriptor>> {
        self.types.get(name).cloned()
    }
}
