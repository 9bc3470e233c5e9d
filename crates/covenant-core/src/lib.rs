//! Core engine of the Covenant framework.
//!
//! Covenant is contract-first: the whole API surface is declared once as an
//! immutable [`contract::Contract`] tree, and everything else derives from
//! it.
//!
//! - [`registry`] binds handlers, middleware, and decorators to contract
//!   endpoints, resolving their dependencies through the [`di`] container.
//! - [`pipeline`] executes a request as one cooperative chain of entries
//!   with first-response-wins short-circuiting.
//! - [`validate`] applies the contract's section schemas uniformly, on the
//!   server and in clients.
//! - [`client`] is the contract-shaped caller; [`client_inproc`] runs it
//!   against the engine directly, without a socket.
//!
//! Transports live outside this crate: `covenant-server` binds a registry
//! to hyper, `covenant-client` implements the HTTP transport.

pub mod client;
pub mod client_inproc;
pub mod contract;
pub mod decorator;
pub mod di;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod request;
pub mod response;
pub mod validate;

pub use client::{ApiClient, CallFailure, CallParts, ClientRequest, ClientTransport, PathBuilder, TransportError};
pub use client_inproc::{in_proc_client, InProcOptions};
pub use contract::{endpoint, response, Contract, ContractError, EndpointDef, ResponseShape};
pub use decorator::{DecoratorContext, EndpointDecorator};
pub use di::{Container, DiError, Lifetime, Scope};
pub use error::HandlerError;
pub use pipeline::{exec_handler_chain, ChainEntry, Next};
pub use registry::{
    EndpointContext, MiddlewareBinding, MiddlewareContext, MiddlewareEntry, Registry,
    RegistryEntry, RegistryError, RegistryHooks, RouteBinding,
};
pub use request::{HandlerInput, RequestObject, RequestParts};
pub use response::{ResponseObject, FAILED_VALIDATION_HEADER};
pub use validate::{parse_section, parse_sections, Section, SectionFailure, SectionSchemas};
