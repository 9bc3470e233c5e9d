//! HTTP transport for the Covenant contract-shaped client.
//!
//! [`HttpTransport`] delivers [`ClientRequest`]s over the network and maps
//! the wire response back into the generic [`ResponseObject`] shape: JSON
//! bodies are decoded, anything else is carried as a string, and network
//! failures surface as [`TransportError`] (never as a status code).
//!
//! # Example
//!
//! ```rust,ignore
//! let transport = Arc::new(HttpTransport::new("http://127.0.0.1:8080"));
//! let client = ApiClient::new(contract, transport);
//! ```

use covenant_core::{ClientRequest, ClientTransport, ResponseObject, TransportError};
use futures_util::future::BoxFuture;
use serde_json::Value;

/// A reqwest-backed [`ClientTransport`].
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport against a base URL (scheme + authority, no
    /// trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a transport reusing a preconfigured reqwest client.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, client }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

impl ClientTransport for HttpTransport {
    fn send(
        &self,
        request: ClientRequest,
    ) -> BoxFuture<'static, Result<ResponseObject, TransportError>> {
        let client = self.client.clone();
        let url = format!("{}{}", self.base_url, request.path);

        Box::pin(async move {
            let mut builder = client.request(request.method.clone(), &url);

            if let Some(Value::Object(query)) = &request.query {
                let pairs: Vec<(String, String)> = query
                    .iter()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(name, value)| (name.clone(), stringify(value)))
                    .collect();
                builder = builder.query(&pairs);
            }

            if let Some(Value::Object(headers)) = &request.headers {
                for (name, value) in headers {
                    builder = builder.header(name, stringify(value));
                }
            }

            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|err| {
                TransportError::with_source(format!("request to {} failed", url), err)
            })?;

            let code = response.status();
            let headers: serde_json::Map<String, Value> = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_lowercase(),
                        Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
                    )
                })
                .collect();

            let bytes = response.bytes().await.map_err(|err| {
                TransportError::with_source("failed to read response body", err)
            })?;

            Ok(ResponseObject {
                code,
                headers: Some(Value::Object(headers)),
                body: decode_body(&bytes),
            })
        })
    }
}
