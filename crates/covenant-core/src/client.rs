//! The contract-shaped client.
//!
//! An [`ApiClient`] walks the same contract the server registered, so a
//! call site names segments and parameters instead of assembling URLs, and
//! request sections are validated against the contract's schemas before
//! anything is sent. The actual delivery is behind [`ClientTransport`]: an
//! HTTP implementation lives in `covenant-client`, and an in-process one in
//! [`crate::client_inproc`].
//!
//! Path builders are immutable values: `seg` and `param` consume the
//! builder and return an extended copy, so two partially-built calls from
//! one client can never interfere.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = ApiClient::new(contract, transport);
//!
//! let response = client
//!     .seg("pokemons")
//!     .param("id", 7)
//!     .get(CallParts::default())
//!     .await?;
//! ```

use crate::contract::{Contract, ContractNode, EndpointDef};
use crate::request::RequestParts;
use crate::response::ResponseObject;
use crate::validate::{parse_section, Section, SectionFailure};
use futures_util::future::BoxFuture;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A fully resolved outgoing request, handed to the transport.
#[derive(Debug, Clone)]
pub struct ClientRequest {
    pub method: Method,
    /// Concrete path, parameters substituted
    pub path: String,
    /// Contract generic path (parameters as `:name`)
    pub generic_path: String,
    pub path_params: HashMap<String, String>,
    /// Validated sections
    pub headers: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
}

/// Delivery failure below the contract level (socket errors, missing
/// in-process handlers). Never used for HTTP statuses the contract
/// declares; those arrive as ordinary [`ResponseObject`]s.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Sends a resolved request and produces the generic response.
pub trait ClientTransport: Send + Sync {
    fn send(
        &self,
        request: ClientRequest,
    ) -> BoxFuture<'static, Result<ResponseObject, TransportError>>;
}

/// Why a call failed before a response was obtained.
#[derive(Debug, Error)]
pub enum CallFailure {
    /// The transport could not deliver the request
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// A request section failed client-side validation; nothing was sent
    #[error("request validation failed for '{}'", .0.section)]
    Validation(SectionFailure),

    /// The chained segments do not name a contract endpoint
    #[error("unknown route: {0}")]
    UnknownRoute(String),
}

/// Unvalidated sections for one call.
#[derive(Debug, Clone, Default)]
pub struct CallParts {
    pub headers: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
}

/// A contract-backed caller.
#[derive(Clone)]
pub struct ApiClient {
    contract: Contract,
    transport: Arc<dyn ClientTransport>,
}

impl ApiClient {
    pub fn new(contract: Contract, transport: Arc<dyn ClientTransport>) -> Self {
        Self {
            contract,
            transport,
        }
    }

    /// Start a path at the contract root.
    pub fn path(&self) -> PathBuilder {
        PathBuilder {
            client: self.clone(),
            keys: Vec::new(),
        }
    }

    /// Start a path with its first literal segment.
    pub fn seg(&self, segment: impl Into<String>) -> PathBuilder {
        self.path().seg(segment)
    }
}

#[derive(Clone)]
enum PathKey {
    Literal(String),
    Param { name: String, value: String },
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Literal(s) => f.write_str(s),
            PathKey::Param { name, .. } => write!(f, ":{}", name),
        }
    }
}

/// An immutable chain of path segments. Terminal method calls resolve the
/// chain against the contract and send the request.
#[derive(Clone)]
pub struct PathBuilder {
    client: ApiClient,
    keys: Vec<PathKey>,
}

impl PathBuilder {
    /// Extend with a literal segment.
    pub fn seg(mut self, segment: impl Into<String>) -> Self {
        self.keys.push(PathKey::Literal(segment.into()));
        self
    }

    /// Extend with a value for the `:name` parameter segment.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.keys.push(PathKey::Param {
            name: name.into(),
            value: value.to_string(),
        });
        self
    }

    pub async fn get(self, parts: CallParts) -> Result<ResponseObject, CallFailure> {
        self.call(Method::GET, parts).await
    }

    pub async fn post(self, parts: CallParts) -> Result<ResponseObject, CallFailure> {
        self.call(Method::POST, parts).await
    }

    pub async fn put(self, parts: CallParts) -> Result<ResponseObject, CallFailure> {
        self.call(Method::PUT, parts).await
    }

    pub async fn patch(self, parts: CallParts) -> Result<ResponseObject, CallFailure> {
        self.call(Method::PATCH, parts).await
    }

    pub async fn delete(self, parts: CallParts) -> Result<ResponseObject, CallFailure> {
        self.call(Method::DELETE, parts).await
    }

    fn generic_path(&self) -> String {
        format!(
            "/{}",
            self.keys
                .iter()
                .map(PathKey::to_string)
                .collect::<Vec<_>>()
                .join("/")
        )
    }

    fn resolve(&self, method: &Method) -> Result<&EndpointDef, CallFailure> {
        let unknown = || CallFailure::UnknownRoute(format!("{} {}", method, self.generic_path()));
        let mut node: &ContractNode = self.client.contract.root();
        for key in &self.keys {
            node = match key {
                PathKey::Literal(segment) => node.child(segment),
                PathKey::Param { name, .. } => node.param_child(name),
            }
            .ok_or_else(unknown)?;
        }
        node.endpoint(method).ok_or_else(unknown)
    }

    /// Resolve the endpoint, validate the sections, and send.
    pub async fn call(self, method: Method, parts: CallParts) -> Result<ResponseObject, CallFailure> {
        let def = self.resolve(&method)?;

        let headers = parse_section(def.headers.as_ref(), parts.headers.as_ref(), Section::Headers)
            .map_err(CallFailure::Validation)?;
        let query = parse_section(def.query.as_ref(), parts.query.as_ref(), Section::Query)
            .map_err(CallFailure::Validation)?;
        let body = parse_section(def.body.as_ref(), parts.body.as_ref(), Section::Body)
            .map_err(CallFailure::Validation)?;

        let mut path_params = HashMap::new();
        let mut segments = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            match key {
                PathKey::Literal(segment) => segments.push(segment.clone()),
                PathKey::Param { name, value } => {
                    path_params.insert(name.clone(), value.clone());
                    segments.push(value.clone());
                }
            }
        }

        let request = ClientRequest {
            method,
            path: format!("/{}", segments.join("/")),
            generic_path: self.generic_path(),
            path_params,
            headers,
            query,
            body,
        };

        Ok(self.client.transport.send(request).await?)
    }
}

pub(crate) fn request_parts_from_client(request: &ClientRequest) -> RequestParts {
    let headers = match &request.headers {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.to_lowercase(), rendered)
            })
            .collect(),
        _ => HashMap::new(),
    };
    RequestParts {
        headers,
        path_params: request.path_params.clone(),
        query: request.query.clone(),
        body: request.body.clone(),
    }
}
