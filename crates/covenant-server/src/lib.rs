//! HTTP transport for a Covenant registry.
//!
//! [`ApiServer`] binds a registry to a TCP listener: incoming hyper
//! requests are matched against the contract's generic paths, translated
//! into the engine's generic request shape, run through the full
//! middleware + decorator + endpoint chain in a fresh DI scope, and the
//! resulting response object is serialized back onto the wire.
//!
//! # Example
//!
//! ```rust,ignore
//! let server = ApiServer::new(registry).bind("127.0.0.1:8080").await?;
//! server.serve().await?;
//! ```

use bytes::Bytes;
use covenant_core::{
    exec_handler_chain, Registry, RegistryEntry, RequestObject, RequestParts, ResponseObject,
};
use http::header::{HeaderName, HeaderValue};
use http::{header, Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Server setup failure.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("invalid listen address '{addr}': {source}")]
    Addr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Two contract paths collapse to the same matcher route
    #[error("conflicting route '{path}': {reason}")]
    RouteConflict { path: String, reason: String },
}

// All entries sharing one generic path, keyed by method for 405 handling.
struct RouteTable {
    generic_path: String,
    by_method: HashMap<Method, Arc<RegistryEntry>>,
}

/// A registry ready to be bound to a listener.
pub struct ApiServer {
    registry: Arc<Registry>,
}

impl ApiServer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Bind the listener and build the route matcher. The returned server
    /// exposes its local address, so binding to port 0 works for tests.
    pub async fn bind(self, addr: &str) -> Result<BoundServer, ServeError> {
        let addr: SocketAddr = addr.parse().map_err(|source| ServeError::Addr {
            addr: addr.to_string(),
            source,
        })?;
        let listener = TcpListener::bind(addr).await?;

        let mut tables: HashMap<String, RouteTable> = HashMap::new();
        for entry in self.registry.entries() {
            let table = tables
                .entry(entry.generic_path().to_string())
                .or_insert_with(|| RouteTable {
                    generic_path: entry.generic_path().to_string(),
                    by_method: HashMap::new(),
                });
            table.by_method.insert(entry.method().clone(), entry);
        }

        let mut router = matchit::Router::new();
        for (path, table) in tables {
            router
                .insert(path.clone(), table)
                .map_err(|err| ServeError::RouteConflict {
                    path,
                    reason: err.to_string(),
                })?;
        }

        let local_addr = listener.local_addr()?;
        info!("covenant server listening on http://{}", local_addr);

        Ok(BoundServer {
            listener,
            router: Arc::new(router),
            registry: self.registry,
        })
    }
}

/// A bound, not-yet-serving server.
pub struct BoundServer {
    listener: TcpListener,
    router: Arc<matchit::Router<RouteTable>>,
    registry: Arc<Registry>,
}

impl BoundServer {
    pub fn local_addr(&self) -> Result<SocketAddr, ServeError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per connection.
    pub async fn serve(self) -> Result<(), ServeError> {
        loop {
            let (stream, _remote_addr) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let router = self.router.clone();
            let registry = self.registry.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: hyper::Request<Incoming>| {
                    let router = router.clone();
                    let registry = registry.clone();
                    async move {
                        let response = handle_request(router, registry, req).await;
                        Ok::<_, Infallible>(response)
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("connection error: {}", err);
                }
            });
        }
    }
}

async fn handle_request(
    router: Arc<matchit::Router<RouteTable>>,
    registry: Arc<Registry>,
    req: hyper::Request<Incoming>,
) -> hyper::Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let raw_query = req.uri().query().map(str::to_string);
    let start = std::time::Instant::now();

    let (parts, body) = req.into_parts();

    let (entry, generic_path, path_params) = match router.at(&path) {
        Ok(matched) => {
            let table = matched.value;
            match table.by_method.get(&method) {
                Some(entry) => {
                    let params: HashMap<String, String> = matched
                        .params
                        .iter()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect();
                    (entry.clone(), table.generic_path.clone(), params)
                }
                None => {
                    let mut allowed: Vec<&str> =
                        table.by_method.keys().map(|m| m.as_str()).collect();
                    allowed.sort_unstable();
                    let mut response = render(ResponseObject::new(StatusCode::METHOD_NOT_ALLOWED)
                        .with_body(json!({
                            "error": format!("method {} not allowed for {}", method, path)
                        })));
                    if let Ok(value) = allowed.join(", ").parse() {
                        response.headers_mut().insert(header::ALLOW, value);
                    }
                    log_request(&method, &path, response.status(), start);
                    return response;
                }
            }
        }
        Err(_) => {
            let response = render(ResponseObject::not_found(format!(
                "no route found for {} {}",
                method, path
            )));
            log_request(&method, &path, response.status(), start);
            return response;
        }
    };

    let headers: HashMap<String, String> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_lowercase(),
                String::from_utf8_lossy(value.as_bytes()).to_string(),
            )
        })
        .collect();

    let body_bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            error!("failed to read request body: {}", err);
            let response = render(
                ResponseObject::new(StatusCode::BAD_REQUEST)
                    .with_body(json!({ "error": "failed to read request body" })),
            );
            log_request(&method, &path, response.status(), start);
            return response;
        }
    };

    let body_value = if body_bytes.is_empty() {
        None
    } else {
        match serde_json::from_slice::<Value>(&body_bytes) {
            Ok(value) => Some(value),
            Err(_) => {
                let response = render(
                    ResponseObject::new(StatusCode::BAD_REQUEST)
                        .with_body(json!({ "error": "request body is not valid JSON" })),
                );
                log_request(&method, &path, response.status(), start);
                return response;
            }
        }
    };

    let query_value = raw_query.as_deref().and_then(parse_query);

    let request = RequestObject {
        method: method.clone(),
        path: path.clone(),
        generic_path,
        parts: RequestParts {
            headers,
            path_params,
            query: query_value,
            body: body_value,
        },
    };

    let scope = registry.create_scope();
    let chain = registry.chain_for(&entry);

    let response = match exec_handler_chain(scope, chain, request).await {
        Ok(Some(response)) => response,
        Ok(None) => {
            error!(method = %method, path = %path, "handler chain produced no response");
            ResponseObject::internal_error("no response produced")
        }
        Err(err) => {
            error!(method = %method, path = %path, error = %err, "handler chain failed");
            ResponseObject::internal_error("internal server error")
        }
    };

    let response = render(response);
    log_request(&method, &path, response.status(), start);
    response
}

fn parse_query(raw: &str) -> Option<Value> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw).ok()?;
    if pairs.is_empty() {
        return None;
    }
    Some(Value::Object(
        pairs
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect(),
    ))
}

fn render_header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_header_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn render(response: ResponseObject) -> hyper::Response<Full<Bytes>> {
    let body = match &response.body {
        Some(value) => Bytes::from(serde_json::to_vec(value).unwrap_or_default()),
        None => Bytes::new(),
    };

    let mut http_response = hyper::Response::new(Full::new(body));
    *http_response.status_mut() = response.code;

    if response.body.is_some() {
        http_response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }

    if let Some(Value::Object(headers)) = &response.headers {
        for (name, value) in headers {
            let rendered = render_header_value(value);
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&rendered),
            ) {
                (Ok(name), Ok(value)) => {
                    http_response.headers_mut().insert(name, value);
                }
                _ => warn!(header = %name, "dropping unrepresentable response header"),
            }
        }
    }

    http_response
}

fn log_request(method: &Method, path: &str, status: StatusCode, start: std::time::Instant) {
    let elapsed = start.elapsed();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "request completed"
        );
    }
}
