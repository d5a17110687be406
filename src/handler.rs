//! Terminal handler surface.
//!
//! The handler runs after every stage and the schema. It receives an
//! [`ActionRequest`] carrying the final context and the typed validated
//! inputs (`serde_json::Value` when the chain has no schema), plus the
//! per-invocation [`Responder`], and returns the response.
//!
//! Implemented automatically for async functions and closures:
//!
//! ```rust,ignore
//! let action = chain.run(|request: ActionRequest<AuthContext, CreateUser>, reply: Responder| async move {
//!     if !request.context.is_admin {
//!         return Ok(reply.error("forbidden"));
//!     }
//!     Ok(reply.data(create(request.inputs).await?))
//! });
//! ```

use std::future::Future;

use serde::Serialize;

use crate::error::ActionResult;
use crate::response::{ActionResponse, Responder};
use crate::transport::{Cookies, Headers};

/// Everything the terminal handler sees for one invocation.
#[derive(Debug, Clone)]
pub struct ActionRequest<C, I> {
    /// Context produced by the last middleware stage.
    pub context: C,
    /// Validated inputs; `serde_json::Value::Null` when no schema is set.
    pub inputs: I,
    /// Read-only cookie view for this invocation.
    pub cookies: Cookies,
    /// Read-only header view for this invocation.
    pub headers: Headers,
}

/// The terminal handler of a chain.
///
/// Implemented automatically for async functions and closures taking an
/// [`ActionRequest`] and a [`Responder`]. `Clone` is required because the
/// frozen action invokes the handler once per call.
pub trait ActionHandler<C, I>: Clone + Send + Sync + 'static {
    /// Payload type of the success response.
    type Data: Serialize + Send + 'static;

    /// Future returned by [`ActionHandler::call`].
    type Future: Future<Output = ActionResult<ActionResponse<Self::Data>>> + Send;

    /// Runs the handler against the final context.
    fn call(&self, request: ActionRequest<C, I>, reply: Responder) -> Self::Future;
}

impl<C, I, F, Fut, O> ActionHandler<C, I> for F
where
    F: Fn(ActionRequest<C, I>, Responder) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = ActionResult<ActionResponse<O>>> + Send + 'static,
    O: Serialize + Send + 'static,
{
    type Data = O;
    type Future = Fut;

    fn call(&self, request: ActionRequest<C, I>, reply: Responder) -> Fut {
        (self)(request, reply)
    }
}
