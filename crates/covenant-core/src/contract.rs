//! The contract tree.
//!
//! A contract declares the whole API surface up front: a tree of path
//! segments (literal or `:param`) whose leaves map HTTP methods to endpoint
//! definitions. Endpoint definitions carry the request section schemas and
//! the declared response shapes per status code. Contracts are immutable
//! once built; registries and clients are derived from them.
//!
//! # Example
//!
//! ```rust
//! use covenant_core::contract::{endpoint, response, Contract};
//! use covenant_schema::{integer, object, string};
//! use http::StatusCode;
//!
//! let contract = Contract::builder()
//!     .route(
//!         "POST /pokemons",
//!         endpoint()
//!             .body(object().field("name", string().min_len(1)))
//!             .response(StatusCode::CREATED, response().body(integer())),
//!     )
//!     .route("GET /pokemons/:id", endpoint().response(StatusCode::OK, response()))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(contract.endpoints().len(), 2);
//! ```

use covenant_schema::{DynSchema, IntoSchema};
use http::{Method, StatusCode};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Contract construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The route spec was not of the form `METHOD /path`
    #[error("invalid route spec '{0}': expected 'METHOD /path'")]
    InvalidRoute(String),

    /// The same method and path were declared twice
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute { method: Method, path: String },
}

/// Declared shape of one response status.
#[derive(Debug, Clone, Default)]
pub struct ResponseShape {
    pub headers: Option<DynSchema>,
    pub body: Option<DynSchema>,
}

/// Start declaring a response shape.
pub fn response() -> ResponseShape {
    ResponseShape::default()
}

impl ResponseShape {
    pub fn headers(mut self, schema: impl IntoSchema) -> Self {
        self.headers = Some(schema.into_schema());
        self
    }

    pub fn body(mut self, schema: impl IntoSchema) -> Self {
        self.body = Some(schema.into_schema());
        self
    }
}

/// Declared shape of one endpoint: request section schemas plus the
/// response shapes per status code.
#[derive(Debug, Clone, Default)]
pub struct EndpointDef {
    pub headers: Option<DynSchema>,
    pub query: Option<DynSchema>,
    pub body: Option<DynSchema>,
    pub responses: HashMap<StatusCode, ResponseShape>,
}

/// Start declaring an endpoint.
pub fn endpoint() -> EndpointDef {
    EndpointDef::default()
}

impl EndpointDef {
    pub fn headers(mut self, schema: impl IntoSchema) -> Self {
        self.headers = Some(schema.into_schema());
        self
    }

    pub fn query(mut self, schema: impl IntoSchema) -> Self {
        self.query = Some(schema.into_schema());
        self
    }

    pub fn body(mut self, schema: impl IntoSchema) -> Self {
        self.body = Some(schema.into_schema());
        self
    }

    pub fn response(mut self, status: StatusCode, shape: ResponseShape) -> Self {
        self.responses.insert(status, shape);
        self
    }
}

/// One node of the contract tree. Children are keyed by path segment,
/// where a leading `:` marks a path parameter.
#[derive(Debug, Default)]
pub struct ContractNode {
    children: BTreeMap<String, ContractNode>,
    endpoints: HashMap<Method, EndpointDef>,
}

impl ContractNode {
    /// Child by exact segment key.
    pub fn child(&self, key: &str) -> Option<&ContractNode> {
        self.children.get(key)
    }

    /// Child for the `:name` parameter segment.
    pub fn param_child(&self, name: &str) -> Option<&ContractNode> {
        self.children.get(&format!(":{}", name))
    }

    /// Endpoint definition for a method on this node.
    pub fn endpoint(&self, method: &Method) -> Option<&EndpointDef> {
        self.endpoints.get(method)
    }
}

/// A flattened endpoint route, produced by [`Contract::endpoints`].
#[derive(Debug, Clone)]
pub struct EndpointRoute {
    pub method: Method,
    /// Path segments, parameters kept as `:name`
    pub segments: Vec<String>,
    /// `/` + segments joined with `/`
    pub generic_path: String,
    pub def: EndpointDef,
}

/// An immutable API declaration. Cheap to clone and share.
#[derive(Debug, Clone)]
pub struct Contract {
    root: Arc<ContractNode>,
}

impl Contract {
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    /// Root of the contract tree.
    pub fn root(&self) -> &ContractNode {
        &self.root
    }

    /// Every declared endpoint, flattened with its computed generic path.
    pub fn endpoints(&self) -> Vec<EndpointRoute> {
        let mut routes = Vec::new();
        let mut segments = Vec::new();
        collect_endpoints(&self.root, &mut segments, &mut routes);
        routes
    }
}

fn collect_endpoints(
    node: &ContractNode,
    segments: &mut Vec<String>,
    routes: &mut Vec<EndpointRoute>,
) {
    for (method, def) in &node.endpoints {
        routes.push(EndpointRoute {
            method: method.clone(),
            segments: segments.clone(),
            generic_path: generic_path(segments),
            def: def.clone(),
        });
    }
    for (key, child) in &node.children {
        segments.push(key.clone());
        collect_endpoints(child, segments, routes);
        segments.pop();
    }
}

/// Compute a generic path from segments (`/` for the root).
pub fn generic_path(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

pub(crate) fn parse_route_spec(spec: &str) -> Result<(Method, Vec<String>), ContractError> {
    let (method, path) = spec
        .split_once(' ')
        .ok_or_else(|| ContractError::InvalidRoute(spec.to_string()))?;
    let method: Method = method
        .parse()
        .map_err(|_| ContractError::InvalidRoute(spec.to_string()))?;
    if !path.starts_with('/') {
        return Err(ContractError::InvalidRoute(spec.to_string()));
    }
    let segments = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    Ok((method, segments))
}

/// Builder for a [`Contract`].
#[derive(Default)]
pub struct ContractBuilder {
    routes: Vec<(String, EndpointDef)>,
}

impl ContractBuilder {
    /// Declare an endpoint at `"METHOD /path"`. Parameter segments are
    /// written `:name`.
    pub fn route(mut self, spec: impl Into<String>, def: EndpointDef) -> Self {
        self.routes.push((spec.into(), def));
        self
    }

    pub fn build(self) -> Result<Contract, ContractError> {
        let mut root = ContractNode::default();

        for (spec, def) in self.routes {
            let (method, segments) = parse_route_spec(&spec)?;
            let mut node = &mut root;
            for segment in &segments {
                node = node.children.entry(segment.clone()).or_default();
            }
            if node.endpoints.contains_key(&method) {
                return Err(ContractError::DuplicateRoute {
                    method,
                    path: generic_path(&segments),
                });
            }
            node.endpoints.insert(method, def);
        }

        Ok(Contract {
            root: Arc::new(root),
        })
    }
}
