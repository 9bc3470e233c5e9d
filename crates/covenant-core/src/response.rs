//! Transport-agnostic response values.

use http::StatusCode;
use serde_json::{json, Value};

/// Header naming the request sections that failed validation on a 400.
pub const FAILED_VALIDATION_HEADER: &str = "x-failed-validation-sections";

/// A response produced by a handler, middleware, or decorator.
///
/// Headers are carried as a JSON object so the same value flows unchanged
/// between the execution engine, the in-process client, and the HTTP
/// transport (which stringifies them onto the wire).
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseObject {
    /// HTTP status code
    pub code: StatusCode,
    /// Response headers as a JSON object, if any
    pub headers: Option<Value>,
    /// Response body, if any
    pub body: Option<Value>,
}

impl ResponseObject {
    /// Create an empty response with the given status.
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            headers: None,
            body: None,
        }
    }

    /// Create a 200 OK response with a body.
    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK).with_body(body)
    }

    /// Create a 201 Created response with a body.
    pub fn created(body: Value) -> Self {
        Self::new(StatusCode::CREATED).with_body(body)
    }

    /// Create a 204 No Content response.
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT)
    }

    /// Create a 404 Not Found response with a message body.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND).with_body(json!({ "error": message.into() }))
    }

    /// Create a 500 Internal Server Error response with a message body.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
            .with_body(json!({ "error": message.into() }))
    }

    /// Create a 400 Bad Request response for failed request validation.
    ///
    /// `failed_sections` names the offending request sections and is carried
    /// in the [`FAILED_VALIDATION_HEADER`] header; `body` is either a plain
    /// string message or a list of validation issues.
    pub fn bad_request(failed_sections: impl Into<String>, body: Value) -> Self {
        Self::new(StatusCode::BAD_REQUEST)
            .with_header(FAILED_VALIDATION_HEADER, Value::String(failed_sections.into()))
            .with_body(body)
    }

    /// Set the response body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a single response header.
    pub fn with_header(mut self, name: impl Into<String>, value: Value) -> Self {
        let headers = self
            .headers
            .get_or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(map) = headers {
            map.insert(name.into(), value);
        }
        self
    }

    /// Look up a header value by name.
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers.as_ref().and_then(|h| h.get(name))
    }
}
