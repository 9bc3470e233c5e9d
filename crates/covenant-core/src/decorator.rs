//! Endpoint decorators.
//!
//! A decorator wraps a single endpoint: it runs after every matching
//! middleware and before the handler, sees the same validated input the
//! handler will see, and either responds (short-circuiting the handler) or
//! drives the chain on via [`DecoratorContext::next`]. Decorators are built
//! per request from a factory so they can resolve scoped services.

use crate::di::{DiError, Scope};
use crate::error::HandlerError;
use crate::pipeline::Next;
use crate::request::HandlerInput;
use crate::response::ResponseObject;
use async_trait::async_trait;
use std::sync::Arc;

/// Context handed to a decorator invocation.
pub struct DecoratorContext {
    pub(crate) next: Next,
}

impl DecoratorContext {
    /// Run the rest of the chain (further decorators, then the handler).
    pub async fn next(&self) -> Result<(), HandlerError> {
        self.next.run().await
    }
}

/// A wrapper around one endpoint's execution.
#[async_trait]
pub trait EndpointDecorator: Send + Sync {
    /// Handle the request. Return `Ok(Some(..))` to respond instead of the
    /// handler, or `Ok(None)` after driving `ctx.next()` to defer.
    async fn handle(
        &self,
        input: HandlerInput,
        ctx: DecoratorContext,
    ) -> Result<Option<ResponseObject>, HandlerError>;
}

pub type BoxedDecorator = Box<dyn EndpointDecorator>;

pub(crate) type DecoratorFactory =
    Arc<dyn Fn(&Scope) -> Result<BoxedDecorator, DiError> + Send + Sync>;
