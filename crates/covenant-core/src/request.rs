//! Generic request values.

use http::Method;
use serde_json::Value;
use std::collections::HashMap;

/// The raw sections of a request, before schema validation.
///
/// Header names are expected lowercased. `query` and `body` are loosely
/// typed JSON values as the transport decoded them.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub headers: HashMap<String, String>,
    pub path_params: HashMap<String, String>,
    pub query: Option<Value>,
    pub body: Option<Value>,
}

/// A full request as the execution engine sees it: raw sections plus the
/// resolved route identity.
#[derive(Debug, Clone)]
pub struct RequestObject {
    pub method: Method,
    /// Concrete request path, parameters substituted
    pub path: String,
    /// Matched endpoint generic path (parameters as `:name`)
    pub generic_path: String,
    pub parts: RequestParts,
}

/// What a handler receives: route identity plus schema-validated sections.
///
/// A section is `None` when its endpoint declared no schema for it, or when
/// an optional schema accepted its absence.
#[derive(Debug, Clone)]
pub struct HandlerInput {
    pub method: Method,
    pub path: String,
    pub generic_path: String,
    pub path_params: HashMap<String, String>,
    pub headers: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
}
