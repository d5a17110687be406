//! Middleware stage surface.
//!
//! A stage receives a [`StageRequest`]: the context produced by the previous
//! stage, a snapshot of the `inputs` slot (JSON `null` until the schema has
//! run), and the invocation's cookie and header views. It returns the next
//! context, which may be the same type or a richer one; each registration
//! narrows the chain's context type to the stage's declared output.
//!
//! The trait is implemented for any async closure of the right shape, so most
//! stages are written inline:
//!
//! ```rust,ignore
//! let chain = ActionRouter::new().use_middleware(
//!     |request: StageRequest<EmptyContext>| async move {
//!         let tenant = request
//!             .headers
//!             .get("x-tenant")
//!             .unwrap_or("public")
//!             .to_string();
//!         Ok(TenantContext { tenant })
//!     },
//! );
//! ```

use std::future::Future;

use crate::error::ActionResult;
use crate::transport::{Cookies, Headers};

/// The root context every chain starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyContext;

/// Everything a middleware stage sees for one invocation.
#[derive(Debug, Clone)]
pub struct StageRequest<C> {
    /// Context returned by the previous stage (or [`EmptyContext`] at the root).
    pub context: C,
    /// Snapshot of the inputs slot: `Value::Null` before the schema has run,
    /// the parsed value afterwards.
    pub inputs: serde_json::Value,
    /// Read-only cookie view for this invocation.
    pub cookies: Cookies,
    /// Read-only header view for this invocation.
    pub headers: Headers,
}

/// One middleware stage in a chain.
///
/// Implemented automatically for async functions and closures taking a
/// [`StageRequest`] and returning `ActionResult<Output>`.
pub trait Middleware<C>: Send + Sync + 'static
where
    C: Send + 'static,
{
    /// Context type handed to the next stage.
    type Output: Send + 'static;

    /// Future returned by [`Middleware::handle`].
    type Future: Future<Output = ActionResult<Self::Output>> + Send;

    /// Processes the request, producing the next context.
    fn handle(&self, request: StageRequest<C>) -> Self::Future;
}

impl<C, F, Fut, O> Middleware<C> for F
where
    C: Send + 'static,
    F: Fn(StageRequest<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActionResult<O>> + Send + 'static,
    O: Send + 'static,
{
    type Output = O;
    type Future = Fut;

    fn handle(&self, request: StageRequest<C>) -> Fut {
        (self)(request)
    }
}
