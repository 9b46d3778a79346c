//! Explicit method registry: names mapped to a parameter signature and a handler.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{HandlerError, JsonRpcError};
use crate::request::RequestParams;

/// One declared parameter. `default == None` means the parameter is required.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
}

impl Param {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Ordered parameter list of a method, used to bind incoming params.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodSignature {
    params: Vec<Param>,
}

impl MethodSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// All parameters required, in the given order.
    pub fn positional(names: &[&str]) -> Self {
        names
            .iter()
            .fold(Self::new(), |signature, name| signature.required(*name))
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: None,
        });
        self
    }

    pub fn optional(mut self, name: impl Into<String>, default: Value) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: Some(default),
        });
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Bind positional or named params to this signature.
    ///
    /// Absent params bind like an empty positional list. Mismatches are
    /// reported as invalid params, with a message naming the method.
    pub fn bind(
        &self,
        method: &str,
        params: Option<RequestParams>,
    ) -> Result<Arguments, JsonRpcError> {
        let values = match params {
            None => self.bind_positional(method, Vec::new())?,
            Some(RequestParams::Array(values)) => self.bind_positional(method, values)?,
            Some(RequestParams::Object(named)) => self.bind_named(method, named)?,
        };

        Ok(Arguments {
            values: self
                .params
                .iter()
                .map(|param| param.name.clone())
                .zip(values)
                .collect(),
        })
    }

    fn bind_positional(&self, method: &str, values: Vec<Value>) -> Result<Vec<Value>, JsonRpcError> {
        if values.len() > self.params.len() {
            return Err(JsonRpcError::invalid_params(format!(
                "{}() takes {} positional arguments but {} were given",
                method,
                self.params.len(),
                values.len()
            )));
        }

        let given = values.len();
        let mut bound = values;
        for param in &self.params[given..] {
            bound.push(Self::default_for(method, param)?);
        }
        Ok(bound)
    }

    fn bind_named(
        &self,
        method: &str,
        mut named: HashMap<String, Value>,
    ) -> Result<Vec<Value>, JsonRpcError> {
        // Sorted so the reported name does not depend on hash order
        let mut unexpected: Vec<&String> = named
            .keys()
            .filter(|key| !self.params.iter().any(|param| &param.name == *key))
            .collect();
        unexpected.sort();
        if let Some(key) = unexpected.first() {
            return Err(JsonRpcError::invalid_params(format!(
                "{}() got an unexpected keyword argument '{}'",
                method, key
            )));
        }

        self.params
            .iter()
            .map(|param| match named.remove(&param.name) {
                Some(value) => Ok(value),
                None => Self::default_for(method, param),
            })
            .collect()
    }

    fn default_for(method: &str, param: &Param) -> Result<Value, JsonRpcError> {
        param.default.clone().ok_or_else(|| {
            JsonRpcError::invalid_params(format!(
                "{}() missing required argument '{}'",
                method, param.name
            ))
        })
    }
}

/// Arguments bound to a signature, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    pub fn index(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, value)| value)
    }

    /// Deserialize one argument. Type mismatches are invalid params.
    pub fn parse<T: DeserializeOwned>(&self, name: &str) -> Result<T, HandlerError> {
        let value = self
            .get(name)
            .ok_or_else(|| HandlerError::invalid_params(format!("unknown argument '{}'", name)))?;
        serde_json::from_value(value.clone()).map_err(|err| {
            HandlerError::invalid_params(format!("argument '{}': {}", name, err))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values.into_iter().map(|(_, value)| value).collect()
    }
}

/// A callable registered under a method name.
#[async_trait]
pub trait RpcHandler: Send + Sync {
    async fn call(&self, args: Arguments) -> Result<Value, HandlerError>;
}

/// Handler backed by a closure returning a boxed future.
pub struct FunctionHandler<F>
where
    F: Fn(Arguments) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync,
{
    handler_fn: F,
}

impl<F> FunctionHandler<F>
where
    F: Fn(Arguments) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync,
{
    pub fn new(handler_fn: F) -> Self {
        Self { handler_fn }
    }
}

#[async_trait]
impl<F> RpcHandler for FunctionHandler<F>
where
    F: Fn(Arguments) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync,
{
    async fn call(&self, args: Arguments) -> Result<Value, HandlerError> {
        (self.handler_fn)(args).await
    }
}

/// A registered method.
#[derive(Clone)]
pub struct MethodEntry {
    pub signature: MethodSignature,
    pub handler: Arc<dyn RpcHandler>,
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Name to handler mapping, built once at startup and shared behind an `Arc`.
#[derive(Debug, Default, Clone)]
pub struct MethodRegistry {
    methods: HashMap<String, MethodEntry>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. A later registration under the same name replaces
    /// the earlier one.
    pub fn register<H>(&mut self, name: impl Into<String>, signature: MethodSignature, handler: H)
    where
        H: RpcHandler + 'static,
    {
        self.methods.insert(
            name.into(),
            MethodEntry {
                signature,
                handler: Arc::new(handler),
            },
        );
    }

    /// Register a synchronous closure.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, signature: MethodSignature, f: F)
    where
        F: Fn(Arguments) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        let handler = FunctionHandler::new(move |args| futures::future::ready(f(args)).boxed());
        self.register(name, signature, handler);
    }

    /// Register a closure whose result arrives later.
    pub fn register_async<F, Fut>(&mut self, name: impl Into<String>, signature: MethodSignature, f: F)
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        let handler = FunctionHandler::new(move |args| f(args).boxed());
        self.register(name, signature, handler);
    }

    pub fn resolve(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.get(name)
    }

    /// Registered method names, sorted.
    pub fn registered_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}
