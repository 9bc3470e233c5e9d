//! The handler chain execution engine.
//!
//! A request runs through an ordered queue of [`ChainEntry`] values:
//! middleware in registration order, then the endpoint's decorators, then
//! the endpoint itself. Entries cooperate through a cloneable [`Next`]
//! handle; an entry that returns a response (or sets one before calling
//! `next()`) short-circuits everything behind it. An entry that neither
//! responds nor calls `next()` simply yields, and the engine moves on to
//! the next entry. The first response set wins.
//!
//! Entries whose generic path is not a segment prefix of the request's
//! generic path are skipped silently, which is what lets one flat
//! middleware list serve every route.

use crate::di::{lock, Scope};
use crate::error::HandlerError;
use crate::request::RequestObject;
use crate::response::ResponseObject;
use futures_util::future::BoxFuture;
use http::Method;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One link of a handler chain.
pub trait ChainEntry: Send + Sync {
    /// Generic path this entry is bound to (`""` or `"/"` match everything).
    fn generic_path(&self) -> &str;

    /// Optional method filter; `None` matches every method.
    fn method(&self) -> Option<&Method> {
        None
    }

    /// Run this entry. Returning `Ok(Some(response))` proposes a response;
    /// the engine ignores it if one was already set further down the chain.
    fn trigger(
        &self,
        scope: Scope,
        request: Arc<RequestObject>,
        next: Next,
    ) -> BoxFuture<'static, Result<Option<ResponseObject>, HandlerError>>;
}

/// True when `prefix` covers `path` on a segment boundary: `/a` matches
/// `/a` and `/a/b` but not `/abc`.
pub fn path_prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() || prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn entry_matches(entry: &dyn ChainEntry, request: &RequestObject) -> bool {
    if let Some(method) = entry.method() {
        if *method != request.method {
            return false;
        }
    }
    path_prefix_matches(entry.generic_path(), &request.generic_path)
}

struct ChainState {
    queue: Mutex<VecDeque<Arc<dyn ChainEntry>>>,
    response: Mutex<Option<ResponseObject>>,
    scope: Scope,
    request: Arc<RequestObject>,
}

impl ChainState {
    fn response_set(&self) -> bool {
        lock(&self.response).is_some()
    }

    fn propose(&self, response: ResponseObject) {
        let mut slot = lock(&self.response);
        if slot.is_none() {
            *slot = Some(response);
        }
    }
}

/// Handle to the rest of the chain. Cloning is cheap; every clone drives
/// the same shared queue and response slot.
#[derive(Clone)]
pub struct Next {
    state: Arc<ChainState>,
}

impl Next {
    /// Run the remaining entries. Idempotent: once a response is set,
    /// further calls return immediately.
    pub fn run(&self) -> BoxFuture<'static, Result<(), HandlerError>> {
        let next = self.clone();
        Box::pin(async move {
            loop {
                if next.state.response_set() {
                    return Ok(());
                }
                let entry = lock(&next.state.queue).pop_front();
                let Some(entry) = entry else {
                    return Ok(());
                };
                if !entry_matches(entry.as_ref(), &next.state.request) {
                    continue;
                }

                let proposed = entry
                    .trigger(
                        next.state.scope.clone(),
                        next.state.request.clone(),
                        next.clone(),
                    )
                    .await?;

                if next.state.response_set() {
                    return Ok(());
                }
                if let Some(response) = proposed {
                    next.state.propose(response);
                    return Ok(());
                }
                // The entry neither responded nor drove the chain; keep going.
            }
        })
    }
}

/// Execute a handler chain to completion.
///
/// Returns `Ok(None)` when no entry produced a response; the caller (a
/// transport, usually) decides what that means.
pub async fn exec_handler_chain(
    scope: Scope,
    entries: Vec<Arc<dyn ChainEntry>>,
    request: RequestObject,
) -> Result<Option<ResponseObject>, HandlerError> {
    let state = Arc::new(ChainState {
        queue: Mutex::new(entries.into()),
        response: Mutex::new(None),
        scope,
        request: Arc::new(request),
    });
    let next = Next {
        state: state.clone(),
    };
    next.run().await?;
    let response = lock(&state.response).take();
    Ok(response)
}
