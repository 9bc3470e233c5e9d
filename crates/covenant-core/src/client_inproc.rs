//! The in-process client.
//!
//! Drives the execution engine directly against a registry, without a
//! socket: the same contract-shaped [`ApiClient`] API, backed by a
//! transport that builds the middleware + decorator + endpoint chain and
//! runs it in a fresh scope per call. Meant for tests, usually with a
//! [`crate::di::Container::test_clone`] container so un-overridden services
//! fail loudly.
//!
//! [`InProcOptions`] restores the test levers a socketless client makes
//! possible: dropping middleware from the chain, mocking the terminal
//! endpoint, and rewriting the request before execution.

use crate::client::{request_parts_from_client, ApiClient, ClientRequest, ClientTransport, TransportError};
use crate::contract::Contract;
use crate::di::{Container, Scope};
use crate::pipeline::{exec_handler_chain, ChainEntry, Next};
use crate::registry::{decorator_entries, endpoint_chain_entry, MiddlewareEntry, Registry};
use crate::request::RequestObject;
use crate::response::ResponseObject;
use futures_util::future::BoxFuture;
use http::Method;
use std::sync::Arc;

type MiddlewareFilter = Arc<dyn Fn(&MiddlewareEntry, usize) -> bool + Send + Sync>;
type EndpointMock = Arc<dyn Fn(&str, &Method, &Scope) -> Option<ResponseObject> + Send + Sync>;
type RequestEnhancer = Arc<dyn Fn(ClientRequest) -> ClientRequest + Send + Sync>;

/// Knobs for in-process execution.
#[derive(Clone, Default)]
pub struct InProcOptions {
    /// Keep only the middleware for which this returns true (by entry and
    /// registration index). `None` keeps everything.
    pub filter_middleware: Option<MiddlewareFilter>,
    /// Replace the terminal endpoint entry with a mock. Returning `None`
    /// from the mock leaves the chain without a response.
    pub mock_endpoint_response: Option<EndpointMock>,
    /// Rewrite the request before the chain runs.
    pub enhance_request: Option<RequestEnhancer>,
}

/// Build an in-process client over a registry.
///
/// `container` is the container calls resolve against, typically a test
/// clone of the registry's production container.
pub fn in_proc_client(
    contract: Contract,
    registry: Arc<Registry>,
    container: Container,
    options: InProcOptions,
) -> ApiClient {
    ApiClient::new(
        contract,
        Arc::new(InProcTransport {
            registry,
            container,
            options,
        }),
    )
}

struct InProcTransport {
    registry: Arc<Registry>,
    container: Container,
    options: InProcOptions,
}

struct MockChainEntry {
    generic_path: String,
    method: Method,
    mock: EndpointMock,
}

impl ChainEntry for MockChainEntry {
    fn generic_path(&self) -> &str {
        &self.generic_path
    }

    fn method(&self) -> Option<&Method> {
        Some(&self.method)
    }

    fn trigger(
        &self,
        scope: Scope,
        request: Arc<RequestObject>,
        _next: Next,
    ) -> BoxFuture<'static, Result<Option<ResponseObject>, crate::error::HandlerError>> {
        let mock = self.mock.clone();
        Box::pin(async move { Ok(mock(&request.generic_path, &request.method, &scope)) })
    }
}

impl ClientTransport for InProcTransport {
    fn send(
        &self,
        request: ClientRequest,
    ) -> BoxFuture<'static, Result<ResponseObject, TransportError>> {
        let registry = self.registry.clone();
        let container = self.container.clone();
        let options = self.options.clone();

        Box::pin(async move {
            let request = match &options.enhance_request {
                Some(enhance) => enhance(request),
                None => request,
            };

            let entry = registry
                .entry(&request.method, &request.generic_path)
                .ok_or_else(|| {
                    TransportError::new(format!(
                        "no registry entry for {} {}",
                        request.method, request.generic_path
                    ))
                })?;

            let mut chain: Vec<Arc<dyn ChainEntry>> = registry
                .middleware_entries()
                .into_iter()
                .enumerate()
                .filter(|(index, middleware)| match &options.filter_middleware {
                    Some(keep) => keep(middleware, *index),
                    None => true,
                })
                .map(|(_, middleware)| middleware as Arc<dyn ChainEntry>)
                .collect();

            chain.extend(decorator_entries(&entry));

            match &options.mock_endpoint_response {
                Some(mock) => chain.push(Arc::new(MockChainEntry {
                    generic_path: entry.generic_path().to_string(),
                    method: entry.method().clone(),
                    mock: mock.clone(),
                })),
                None => {
                    if !entry.has_handler() {
                        return Err(TransportError::new(format!(
                            "handler not registered for {} {}",
                            request.method, request.generic_path
                        )));
                    }
                    chain.push(endpoint_chain_entry(&entry));
                }
            }

            let scope = container.create_scope();
            let request_object = RequestObject {
                method: request.method.clone(),
                path: request.path.clone(),
                generic_path: request.generic_path.clone(),
                parts: request_parts_from_client(&request),
            };

            let response = exec_handler_chain(scope, chain, request_object)
                .await
                .map_err(|err| {
                    TransportError::new(format!("handler chain failed: {}", err))
                })?;

            response.ok_or_else(|| {
                TransportError::new(format!(
                    "no response produced for {} {}",
                    request.method, request.generic_path
                ))
            })
        })
    }
}
