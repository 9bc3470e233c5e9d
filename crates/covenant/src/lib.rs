//! # Covenant
//!
//! A contract-first API framework for Rust.
//!
//! Covenant starts from a single immutable [`Contract`]: a tree of routes,
//! each endpoint declaring schemas for its headers, query, and body, plus
//! the response shapes it may produce. Servers, clients, and tests all
//! derive from that one declaration, so request validation is identical on
//! every side of the wire.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use covenant::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let contract = Contract::builder()
//!         .route(
//!             "POST /greetings",
//!             endpoint()
//!                 .body(object().field("name", string().min_len(1)))
//!                 .response(StatusCode::CREATED, response()),
//!         )
//!         .build()?;
//!
//!     let registry = Arc::new(Registry::new(Container::builder().build(), &contract));
//!
//!     registry
//!         .route("POST /greetings")?
//!         .register(|input, _ctx: EndpointContext<()>| async move {
//!             Ok(ResponseObject::created(json!({ "greeting": input.body })))
//!         });
//!
//!     let server = ApiServer::new(registry).bind("127.0.0.1:8080").await?;
//!     server.serve().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Crates
//!
//! - `covenant-schema` - composable JSON validators for contract sections
//! - `covenant-core` - contract tree, DI container, registry, chain engine,
//!   and the contract-shaped client (network and in-process)
//! - `covenant-server` - hyper transport binding a registry to a listener
//! - `covenant-client` - reqwest transport for calling a remote registry
//!
//! ## Optional Features
//!
//! Both transports are on by default:
//!
//! - `server` - the hyper-based network transport (`ApiServer`)
//! - `client` - the reqwest-backed HTTP client transport (`HttpTransport`)
//!
//! The in-process client needs neither feature; it lives in the core.

// Re-export the engine
pub use covenant_core::*;

// Re-export the schema vocabulary under its own namespace
pub use covenant_schema as schema;

#[cfg(feature = "server")]
pub use covenant_server::{ApiServer, BoundServer, ServeError};

#[cfg(feature = "client")]
pub use covenant_client::HttpTransport;

/// Prelude module - import everything you need with `use covenant::prelude::*`
pub mod prelude {
    // Contract declaration
    pub use covenant_core::contract::{
        endpoint, response, Contract, ContractError, EndpointDef, ResponseShape,
    };

    // Dependency injection
    pub use covenant_core::di::{Container, DiError, Lifetime, Scope};

    // Registry and handler bindings
    pub use covenant_core::registry::{
        EndpointContext, MiddlewareContext, Registry, RegistryError, RegistryHooks, RouteBinding,
    };

    // Decorators
    pub use covenant_core::decorator::{DecoratorContext, EndpointDecorator};

    // Request/response shapes and errors
    pub use covenant_core::{HandlerError, HandlerInput, RequestObject, ResponseObject};

    // Contract-shaped clients
    pub use covenant_core::{
        in_proc_client, ApiClient, CallFailure, CallParts, ClientTransport, InProcOptions,
        TransportError,
    };

    // Schema combinators
    pub use covenant_schema::{
        array, boolean, integer, literal, nullable, number, object, optional, string, union,
        Schema,
    };

    // Re-export commonly used external types
    pub use http::{Method, StatusCode};
    pub use serde_json::{json, Value};
    pub use std::sync::Arc;
    pub use tracing::{debug, error, info, trace, warn};

    #[cfg(feature = "server")]
    pub use covenant_server::ApiServer;

    #[cfg(feature = "client")]
    pub use covenant_client::HttpTransport;
}
