//! The handler registry.
//!
//! A registry is built from a contract and a DI container. It owns one
//! [`RegistryEntry`] per declared endpoint (registries never share entries,
//! so two registries over one contract stay independent) plus an ordered,
//! append-only middleware list. Handlers, middleware, and decorators are
//! bound through the typed [`RouteBinding`] / [`MiddlewareBinding`] APIs.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = Registry::new(container, &contract);
//!
//! registry
//!     .route("GET /pokemons/:id")?
//!     .inject(|scope| Ok(scope.resolve::<PokemonRepo>("PokemonRepo")?))
//!     .register(|input, ctx| async move {
//!         let id = input.path_params["id"].clone();
//!         match ctx.injected.find(&id) {
//!             Some(p) => Ok(ResponseObject::ok(p)),
//!             None => Ok(ResponseObject::not_found("no such pokemon")),
//!         }
//!     });
//! ```

use crate::contract::{generic_path, parse_route_spec, Contract, ContractError, EndpointDef};
use crate::decorator::{BoxedDecorator, DecoratorContext, DecoratorFactory, EndpointDecorator};
use crate::di::{lock, Container, DiError, Scope};
use crate::error::HandlerError;
use crate::pipeline::{ChainEntry, Next};
use crate::request::{HandlerInput, RequestObject, RequestParts};
use crate::response::ResponseObject;
use crate::validate::{parse_sections, ParsedSections, SectionSchemas};
use futures_util::future::BoxFuture;
use http::Method;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

/// Registry binding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// The contract declares no endpoint at this method and path
    #[error("no contract endpoint for {method} {path}")]
    UnknownRoute { method: Method, path: String },

    /// The middleware spec was not `""`, `/prefix`, or `METHOD /prefix`
    #[error("invalid middleware spec '{0}'")]
    InvalidMiddlewareSpec(String),
}

type ErasedEndpointHandler = Arc<
    dyn Fn(HandlerInput, Scope) -> BoxFuture<'static, Result<ResponseObject, HandlerError>>
        + Send
        + Sync,
>;

type ErasedMiddlewareHandler = Arc<
    dyn Fn(HandlerInput, Scope, Next) -> BoxFuture<'static, Result<Option<ResponseObject>, HandlerError>>
        + Send
        + Sync,
>;

type Injector<T> = Arc<dyn Fn(&Scope) -> Result<T, DiError> + Send + Sync>;

/// Context handed to an endpoint handler.
pub struct EndpointContext<T> {
    /// Whatever the route's injector resolved from the request scope
    pub injected: T,
}

/// Context handed to a middleware handler.
pub struct MiddlewareContext<T> {
    pub injected: T,
    pub(crate) next: Next,
}

impl<T> MiddlewareContext<T> {
    /// Run the rest of the chain. Middleware that wants to act on the way
    /// out (or catch downstream errors) awaits this and inspects the
    /// result.
    pub async fn next(&self) -> Result<(), HandlerError> {
        self.next.run().await
    }
}

/// Hooks fired when bindings are registered, for transports that mirror
/// registrations elsewhere.
#[derive(Clone, Default)]
pub struct RegistryHooks {
    pub on_handler_registered: Option<Arc<dyn Fn(&RegistryEntry) + Send + Sync>>,
    pub on_middleware_registered: Option<Arc<dyn Fn(&MiddlewareEntry) + Send + Sync>>,
}

/// One endpoint of a registry: the contract definition plus the bound
/// handler and decorators.
pub struct RegistryEntry {
    method: Method,
    segments: Vec<String>,
    generic_path: String,
    def: EndpointDef,
    handler: Mutex<Option<ErasedEndpointHandler>>,
    decorators: Mutex<Vec<DecoratorFactory>>,
}

impl RegistryEntry {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn generic_path(&self) -> &str {
        &self.generic_path
    }

    pub fn has_handler(&self) -> bool {
        lock(&self.handler).is_some()
    }

    /// Response shapes declared for this endpoint.
    pub fn def(&self) -> &EndpointDef {
        &self.def
    }

    fn schemas(&self) -> SectionSchemas {
        SectionSchemas {
            headers: self.def.headers.clone(),
            query: self.def.query.clone(),
            body: self.def.body.clone(),
        }
    }

    // Substitute path parameters into the endpoint's segments; a missing
    // parameter renders as "?" rather than failing the whole request.
    fn resolve_path(&self, params: &HashMap<String, String>) -> String {
        let resolved: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => params.get(name).cloned().unwrap_or_else(|| "?".to_string()),
                None => segment.clone(),
            })
            .collect();
        generic_path(&resolved)
    }

    fn handler_input(&self, request: &RequestObject, parsed: ParsedSections) -> HandlerInput {
        HandlerInput {
            method: self.method.clone(),
            path: self.resolve_path(&request.parts.path_params),
            generic_path: self.generic_path.clone(),
            path_params: request.parts.path_params.clone(),
            headers: parsed.headers,
            query: parsed.query,
            body: parsed.body,
        }
    }

    fn validate(&self, request: &RequestObject) -> Result<HandlerInput, ResponseObject> {
        match parse_sections(
            &self.schemas(),
            &request.parts.headers,
            request.parts.query.as_ref(),
            request.parts.body.as_ref(),
        ) {
            Ok(parsed) => Ok(self.handler_input(request, parsed)),
            Err(failure) => Err(failure.into_response()),
        }
    }

    /// Validate and invoke the bound handler directly, bypassing middleware
    /// and decorators. This is the entry point tests and transports use.
    pub async fn trigger(
        &self,
        scope: &Scope,
        parts: RequestParts,
    ) -> Result<Option<ResponseObject>, HandlerError> {
        let request = RequestObject {
            method: self.method.clone(),
            path: self.resolve_path(&parts.path_params),
            generic_path: self.generic_path.clone(),
            parts,
        };
        self.invoke(scope.clone(), &request).await
    }

    pub(crate) async fn invoke(
        &self,
        scope: Scope,
        request: &RequestObject,
    ) -> Result<Option<ResponseObject>, HandlerError> {
        let handler = lock(&self.handler)
            .clone()
            .ok_or_else(|| HandlerError::HandlerNotRegistered {
                method: self.method.clone(),
                generic_path: self.generic_path.clone(),
            })?;
        let input = match self.validate(request) {
            Ok(input) => input,
            Err(response) => return Ok(Some(response)),
        };
        handler(input, scope).await.map(Some)
    }

    pub(crate) fn decorator_factories(&self) -> Vec<DecoratorFactory> {
        lock(&self.decorators).clone()
    }
}

struct EndpointChainEntry {
    entry: Arc<RegistryEntry>,
}

impl ChainEntry for EndpointChainEntry {
    fn generic_path(&self) -> &str {
        self.entry.generic_path()
    }

    fn method(&self) -> Option<&Method> {
        Some(self.entry.method())
    }

    fn trigger(
        &self,
        scope: Scope,
        request: Arc<RequestObject>,
        _next: Next,
    ) -> BoxFuture<'static, Result<Option<ResponseObject>, HandlerError>> {
        let entry = self.entry.clone();
        Box::pin(async move { entry.invoke(scope, &request).await })
    }
}

struct DecoratorChainEntry {
    entry: Arc<RegistryEntry>,
    factory: DecoratorFactory,
}

impl ChainEntry for DecoratorChainEntry {
    fn generic_path(&self) -> &str {
        self.entry.generic_path()
    }

    fn method(&self) -> Option<&Method> {
        Some(self.entry.method())
    }

    fn trigger(
        &self,
        scope: Scope,
        request: Arc<RequestObject>,
        next: Next,
    ) -> BoxFuture<'static, Result<Option<ResponseObject>, HandlerError>> {
        let entry = self.entry.clone();
        let factory = self.factory.clone();
        Box::pin(async move {
            let input = match entry.validate(&request) {
                Ok(input) => input,
                Err(response) => return Ok(Some(response)),
            };
            let decorator = factory(&scope)?;
            decorator.handle(input, DecoratorContext { next }).await
        })
    }
}

/// A registered middleware: a generic-path prefix, an optional method
/// filter, its own section schemas, and the handler.
pub struct MiddlewareEntry {
    generic_path: String,
    method: Option<Method>,
    schemas: SectionSchemas,
    handler: ErasedMiddlewareHandler,
}

impl MiddlewareEntry {
    pub fn generic_path(&self) -> &str {
        &self.generic_path
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }
}

impl ChainEntry for MiddlewareEntry {
    fn generic_path(&self) -> &str {
        &self.generic_path
    }

    fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    fn trigger(
        &self,
        scope: Scope,
        request: Arc<RequestObject>,
        next: Next,
    ) -> BoxFuture<'static, Result<Option<ResponseObject>, HandlerError>> {
        let schemas = self.schemas.clone();
        let handler = self.handler.clone();
        Box::pin(async move {
            let parsed = match parse_sections(
                &schemas,
                &request.parts.headers,
                request.parts.query.as_ref(),
                request.parts.body.as_ref(),
            ) {
                Ok(parsed) => parsed,
                Err(failure) => return Ok(Some(failure.into_response())),
            };
            // Middleware sees the request's own route identity.
            let input = HandlerInput {
                method: request.method.clone(),
                path: request.path.clone(),
                generic_path: request.generic_path.clone(),
                path_params: request.parts.path_params.clone(),
                headers: parsed.headers,
                query: parsed.query,
                body: parsed.body,
            };
            handler(input, scope, next).await
        })
    }
}

fn parse_middleware_spec(spec: &str) -> Result<(Option<Method>, String), RegistryError> {
    if spec.is_empty() {
        return Ok((None, String::new()));
    }
    if spec.starts_with('/') {
        return Ok((None, spec.to_string()));
    }
    let invalid = || RegistryError::InvalidMiddlewareSpec(spec.to_string());
    let (method, path) = spec.split_once(' ').ok_or_else(invalid)?;
    let method: Method = method.parse().map_err(|_| invalid())?;
    if !path.starts_with('/') {
        return Err(invalid());
    }
    Ok((Some(method), path.to_string()))
}

/// Binds handlers to a contract.
pub struct Registry {
    container: Container,
    entries: HashMap<(Method, String), Arc<RegistryEntry>>,
    middleware: Arc<RwLock<Vec<Arc<MiddlewareEntry>>>>,
    hooks: RegistryHooks,
}

impl Registry {
    pub fn new(container: Container, contract: &Contract) -> Self {
        Self::with_hooks(container, contract, RegistryHooks::default())
    }

    /// Build a registry with registration hooks. Every contract endpoint
    /// gets a fresh entry; the hooks fire when a handler or middleware is
    /// registered, not at construction.
    pub fn with_hooks(container: Container, contract: &Contract, hooks: RegistryHooks) -> Self {
        let entries = contract
            .endpoints()
            .into_iter()
            .map(|route| {
                let entry = Arc::new(RegistryEntry {
                    method: route.method.clone(),
                    generic_path: route.generic_path.clone(),
                    segments: route.segments,
                    def: route.def,
                    handler: Mutex::new(None),
                    decorators: Mutex::new(Vec::new()),
                });
                ((route.method, route.generic_path), entry)
            })
            .collect();

        Self {
            container,
            entries,
            middleware: Arc::new(RwLock::new(Vec::new())),
            hooks,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn create_scope(&self) -> Scope {
        self.container.create_scope()
    }

    /// Look up the entry bound at a method and generic path.
    pub fn entry(&self, method: &Method, generic_path: &str) -> Option<Arc<RegistryEntry>> {
        self.entries
            .get(&(method.clone(), generic_path.to_string()))
            .cloned()
    }

    /// Every endpoint entry, in no particular order.
    pub fn entries(&self) -> Vec<Arc<RegistryEntry>> {
        self.entries.values().cloned().collect()
    }

    /// Snapshot of the middleware list, in registration order.
    pub fn middleware_entries(&self) -> Vec<Arc<MiddlewareEntry>> {
        self.middleware
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The full chain for an endpoint: middleware (in registration order,
    /// matching is done by the engine), then decorators, then the endpoint.
    pub fn chain_for(&self, entry: &Arc<RegistryEntry>) -> Vec<Arc<dyn ChainEntry>> {
        let mut chain: Vec<Arc<dyn ChainEntry>> = self
            .middleware_entries()
            .into_iter()
            .map(|m| m as Arc<dyn ChainEntry>)
            .collect();
        chain.extend(decorator_entries(entry));
        chain.push(endpoint_chain_entry(entry));
        chain
    }

    /// Start binding a handler to `"METHOD /path"`.
    pub fn route(&self, spec: &str) -> Result<RouteBinding, RegistryError> {
        let (method, segments) = parse_route_spec(spec)?;
        let path = generic_path(&segments);
        let entry = self
            .entry(&method, &path)
            .ok_or(RegistryError::UnknownRoute { method, path })?;
        Ok(RouteBinding {
            entry,
            hooks: self.hooks.clone(),
            injector: Arc::new(|_| Ok(())),
        })
    }

    /// Start binding a middleware. `spec` is `""` (every request), a
    /// generic-path prefix, or `"METHOD /prefix"`.
    pub fn middleware(&self, spec: &str) -> Result<MiddlewareBinding, RegistryError> {
        let (method, path) = parse_middleware_spec(spec)?;
        Ok(MiddlewareBinding {
            list: self.middleware.clone(),
            hooks: self.hooks.clone(),
            method,
            generic_path: path,
            schemas: SectionSchemas::default(),
            injector: Arc::new(|_| Ok(())),
        })
    }
}

pub(crate) fn decorator_entries(entry: &Arc<RegistryEntry>) -> Vec<Arc<dyn ChainEntry>> {
    entry
        .decorator_factories()
        .into_iter()
        .map(|factory| {
            Arc::new(DecoratorChainEntry {
                entry: entry.clone(),
                factory,
            }) as Arc<dyn ChainEntry>
        })
        .collect()
}

pub(crate) fn endpoint_chain_entry(entry: &Arc<RegistryEntry>) -> Arc<dyn ChainEntry> {
    Arc::new(EndpointChainEntry {
        entry: entry.clone(),
    })
}

/// Typed binding for one endpoint.
pub struct RouteBinding<T = ()> {
    entry: Arc<RegistryEntry>,
    hooks: RegistryHooks,
    injector: Injector<T>,
}

impl<T: Send + 'static> RouteBinding<T> {
    /// Replace the injector: a function resolving whatever the handler
    /// needs from the request scope.
    pub fn inject<U, F>(self, injector: F) -> RouteBinding<U>
    where
        U: Send + 'static,
        F: Fn(&Scope) -> Result<U, DiError> + Send + Sync + 'static,
    {
        RouteBinding {
            entry: self.entry,
            hooks: self.hooks,
            injector: Arc::new(injector),
        }
    }

    /// Append a decorator, built per request from `factory`. Decorators
    /// run in registration order, before the handler.
    pub fn decorate<D, F>(self, factory: F) -> Self
    where
        D: EndpointDecorator + 'static,
        F: Fn(&Scope) -> Result<D, DiError> + Send + Sync + 'static,
    {
        lock(&self.entry.decorators).push(Arc::new(move |scope: &Scope| {
            Ok(Box::new(factory(scope)?) as BoxedDecorator)
        }));
        self
    }

    /// Bind the handler. Replaces any previously bound handler and fires
    /// the registration hook.
    pub fn register<H, Fut>(self, handler: H) -> Self
    where
        H: Fn(HandlerInput, EndpointContext<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResponseObject, HandlerError>> + Send + 'static,
    {
        let injector = self.injector.clone();
        let handler = Arc::new(handler);
        let erased: ErasedEndpointHandler = Arc::new(move |input, scope| {
            let injector = injector.clone();
            let handler = handler.clone();
            Box::pin(async move {
                let injected = injector(&scope)?;
                handler(input, EndpointContext { injected }).await
            })
        });
        *lock(&self.entry.handler) = Some(erased);

        debug!(
            method = %self.entry.method(),
            path = %self.entry.generic_path(),
            "handler registered"
        );
        if let Some(hook) = &self.hooks.on_handler_registered {
            hook(&self.entry);
        }
        self
    }

    /// Validate and invoke the bound handler directly, bypassing middleware
    /// and decorators.
    pub async fn trigger(
        &self,
        scope: &Scope,
        parts: RequestParts,
    ) -> Result<Option<ResponseObject>, HandlerError> {
        self.entry.trigger(scope, parts).await
    }

    pub fn entry(&self) -> &Arc<RegistryEntry> {
        &self.entry
    }
}

/// Typed binding for one middleware registration.
pub struct MiddlewareBinding<T = ()> {
    list: Arc<RwLock<Vec<Arc<MiddlewareEntry>>>>,
    hooks: RegistryHooks,
    method: Option<Method>,
    generic_path: String,
    schemas: SectionSchemas,
    injector: Injector<T>,
}

impl<T: Send + 'static> MiddlewareBinding<T> {
    pub fn inject<U, F>(self, injector: F) -> MiddlewareBinding<U>
    where
        U: Send + 'static,
        F: Fn(&Scope) -> Result<U, DiError> + Send + Sync + 'static,
    {
        MiddlewareBinding {
            list: self.list,
            hooks: self.hooks,
            method: self.method,
            generic_path: self.generic_path,
            schemas: self.schemas,
            injector: Arc::new(injector),
        }
    }

    /// Section schemas this middleware validates before running.
    pub fn schemas(mut self, schemas: SectionSchemas) -> Self {
        self.schemas = schemas;
        self
    }

    /// Append the middleware to the registry's list and fire the
    /// registration hook.
    pub fn register<H, Fut>(self, handler: H) -> Arc<MiddlewareEntry>
    where
        H: Fn(HandlerInput, MiddlewareContext<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<ResponseObject>, HandlerError>> + Send + 'static,
    {
        let injector = self.injector.clone();
        let handler = Arc::new(handler);
        let erased: ErasedMiddlewareHandler = Arc::new(move |input, scope, next| {
            let injector = injector.clone();
            let handler = handler.clone();
            Box::pin(async move {
                let injected = injector(&scope)?;
                handler(input, MiddlewareContext { injected, next }).await
            })
        });

        let entry = Arc::new(MiddlewareEntry {
            generic_path: self.generic_path,
            method: self.method,
            schemas: self.schemas,
            handler: erased,
        });

        self.list
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());

        debug!(path = %entry.generic_path(), "middleware registered");
        if let Some(hook) = &self.hooks.on_middleware_registered {
            hook(&entry);
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{endpoint, response, Contract};
    use crate::di::Container;
    use crate::response::FAILED_VALIDATION_HEADER;
    use covenant_schema::{object, string};
    use http::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn contract() -> Contract {
        Contract::builder()
            .route(
                "POST /things",
                endpoint()
                    .body(object().field("name", string().min_len(1)))
                    .response(StatusCode::CREATED, response()),
            )
            .route("GET /things/:id", endpoint().response(StatusCode::OK, response()))
            .build()
            .unwrap()
    }

    fn registry() -> Registry {
        Registry::new(Container::builder().build(), &contract())
    }

    #[test]
    fn route_lookup_requires_a_contract_endpoint() {
        let err = registry().route("GET /nope").err().unwrap();
        assert_eq!(
            err,
            RegistryError::UnknownRoute {
                method: Method::GET,
                path: "/nope".into(),
            }
        );
    }

    #[tokio::test]
    async fn trigger_before_register_fails() {
        let registry = registry();
        let scope = registry.create_scope();
        let err = registry
            .route("GET /things/:id")
            .unwrap()
            .trigger(&scope, RequestParts::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::HandlerNotRegistered { .. }));
    }

    #[tokio::test]
    async fn register_and_trigger_directly() {
        let registry = registry();
        let scope = registry.create_scope();

        let binding = registry
            .route("GET /things/:id")
            .unwrap()
            .register(|input, _ctx: EndpointContext<()>| async move {
                Ok(ResponseObject::ok(json!({
                    "id": input.path_params["id"],
                    "path": input.path,
                })))
            });

        let response = binding
            .trigger(
                &scope,
                RequestParts {
                    path_params: HashMap::from([("id".to_string(), "7".to_string())]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.code, StatusCode::OK);
        assert_eq!(response.body, Some(json!({ "id": "7", "path": "/things/7" })));
    }

    #[tokio::test]
    async fn trigger_validates_sections_first() {
        let registry = registry();
        let scope = registry.create_scope();

        let binding = registry
            .route("POST /things")
            .unwrap()
            .register(|_input, _ctx: EndpointContext<()>| async move {
                Ok(ResponseObject::created(json!(1)))
            });

        let response = binding
            .trigger(&scope, RequestParts::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.code, StatusCode::BAD_REQUEST);
        assert_eq!(response.header(FAILED_VALIDATION_HEADER), Some(&json!("body")));
    }

    #[tokio::test]
    async fn injection_resolves_from_the_request_scope() {
        struct Greeting(String);
        let container = Container::builder()
            .scoped("Greeting", |_| Ok(Greeting("hello".into())))
            .build();
        let registry = Registry::new(container, &contract());
        let scope = registry.create_scope();

        let binding = registry
            .route("GET /things/:id")
            .unwrap()
            .inject(|scope| scope.resolve::<Greeting>("Greeting"))
            .register(|_input, ctx| async move { Ok(ResponseObject::ok(json!(ctx.injected.0))) });

        let response = binding
            .trigger(&scope, RequestParts::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.body, Some(json!("hello")));
    }

    #[tokio::test]
    async fn failed_injection_surfaces_as_handler_error() {
        let registry = registry();
        let scope = registry.create_scope();

        let binding = registry
            .route("GET /things/:id")
            .unwrap()
            .inject(|scope| scope.resolve::<String>("Missing"))
            .register(|_input, _ctx| async move { Ok(ResponseObject::no_content()) });

        let err = binding
            .trigger(&scope, RequestParts::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Di(DiError::NotRegistered(_))));
    }

    #[test]
    fn hooks_fire_on_registration() {
        let handlers = Arc::new(AtomicUsize::new(0));
        let middleware = Arc::new(AtomicUsize::new(0));
        let h = handlers.clone();
        let m = middleware.clone();
        let registry = Registry::with_hooks(
            Container::builder().build(),
            &contract(),
            RegistryHooks {
                on_handler_registered: Some(Arc::new(move |_| {
                    h.fetch_add(1, Ordering::SeqCst);
                })),
                on_middleware_registered: Some(Arc::new(move |_| {
                    m.fetch_add(1, Ordering::SeqCst);
                })),
            },
        );

        registry
            .route("GET /things/:id")
            .unwrap()
            .register(|_input, _ctx: EndpointContext<()>| async move {
                Ok(ResponseObject::no_content())
            });
        registry
            .middleware("/things")
            .unwrap()
            .register(|_input, _ctx: MiddlewareContext<()>| async move { Ok(None) });

        assert_eq!(handlers.load(Ordering::SeqCst), 1);
        assert_eq!(middleware.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn middleware_spec_parsing() {
        let registry = registry();
        assert!(registry.middleware("").is_ok());
        assert!(registry.middleware("/things").is_ok());
        assert!(registry.middleware("GET /things").is_ok());
        assert!(registry.middleware("things").is_err());
        assert!(registry.middleware("GET things").is_err());
    }

    #[test]
    fn registries_do_not_share_entries() {
        let contract = contract();
        let a = Registry::new(Container::builder().build(), &contract);
        let b = Registry::new(Container::builder().build(), &contract);

        a.route("GET /things/:id")
            .unwrap()
            .register(|_input, _ctx: EndpointContext<()>| async move {
                Ok(ResponseObject::no_content())
            });

        assert!(a.entry(&Method::GET, "/things/:id").unwrap().has_handler());
        assert!(!b.entry(&Method::GET, "/things/:id").unwrap().has_handler());
    }
}
