//! Failure classification around user-supplied stages and handlers.
//!
//! Each middleware stage is wrapped once at registration time, capturing the
//! rendered action path at that point; the terminal handler is wrapped once
//! at `run` time. The wrappers translate raw escaping errors into the
//! unhandled taxonomy kind while letting deliberately raised kinds pass
//! through untouched, so the terminal boundary sees exactly one
//! classification per failure.

use std::sync::Arc;

use crate::error::{ActionError, UnhandledKind};
use crate::handler::{ActionHandler, ActionRequest};
use crate::middleware::{Middleware, StageRequest};
use crate::response::Responder;
use serde::de::DeserializeOwned;

use super::types::{BoxedActionHandler, PipelineContext, StageEntry};

/// Classifies one escaping failure at a wrap point.
///
/// Declared errors, schema violations, transport signals, and already-wrapped
/// taxonomy kinds pass through unchanged; only raw errors get wrapped as
/// unhandled, tagged with the wrap point's kind and path.
pub(crate) fn classify_failure(err: ActionError, kind: UnhandledKind, path: &str) -> ActionError {
    match err {
        ActionError::Other(source) => ActionError::unhandled(kind, path, source),
        recognized => recognized,
    }
}

/// Wraps a middleware stage into an erased entry for the stage list.
pub(crate) fn wrap_stage<C, M>(middleware: M, path: String) -> StageEntry
where
    C: Send + 'static,
    M: Middleware<C>,
{
    let middleware = Arc::new(middleware);
    StageEntry {
        run: Arc::new(move |ctx: PipelineContext| {
            let middleware = Arc::clone(&middleware);
            let path = path.clone();
            Box::pin(async move {
                let PipelineContext {
                    state,
                    inputs,
                    cookies,
                    headers,
                } = ctx;
                let context = *state.downcast::<C>().map_err(|_| {
                    ActionError::internal(
                        "middleware stage received an unexpected context type",
                        path.as_str(),
                    )
                })?;
                let request = StageRequest {
                    context,
                    inputs: inputs.clone(),
                    cookies: cookies.clone(),
                    headers: headers.clone(),
                };
                match middleware.handle(request).await {
                    Ok(next) => Ok(PipelineContext {
                        state: Box::new(next),
                        inputs,
                        cookies,
                        headers,
                    }),
                    Err(err) => Err(classify_failure(err, UnhandledKind::Middleware, &path)),
                }
            })
        }),
    }
}

/// Wraps the terminal handler at `run` time, capturing the full action path.
pub(crate) fn wrap_handler<C, I, H>(handler: H, path: String) -> BoxedActionHandler<H::Data>
where
    C: Send + 'static,
    I: DeserializeOwned + Send + 'static,
    H: ActionHandler<C, I>,
{
    Arc::new(move |ctx: PipelineContext, reply: Responder| {
        let handler = handler.clone();
        let path = path.clone();
        Box::pin(async move {
            let PipelineContext {
                state,
                inputs,
                cookies,
                headers,
            } = ctx;
            let context = *state.downcast::<C>().map_err(|_| {
                ActionError::internal(
                    "handler received an unexpected context type",
                    path.as_str(),
                )
            })?;
            // The inputs slot was serialized from the schema's parsed value
            // (or is Null for Value-typed handlers), so a decode failure here
            // is an engine defect, not user error.
            let inputs: I = serde_json::from_value(inputs).map_err(|err| {
                ActionError::internal(
                    format!("handler inputs failed to rehydrate: {err}"),
                    path.as_str(),
                )
            })?;
            let request = ActionRequest {
                context,
                inputs,
                cookies,
                headers,
            };
            handler
                .call(request, reply)
                .await
                .map_err(|err| classify_failure(err, UnhandledKind::Handler, &path))
        })
    })
}
