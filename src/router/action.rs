//! The invocable unit produced by `run` and its terminal error boundary.
//!
//! An [`Action`] owns the frozen stage list, schema slot, wrapped handler,
//! and shared configuration captured when the chain was frozen. Every call to
//! [`Action::invoke`] is independent: per-invocation state (context, inputs,
//! responder) is owned by that call, and the shared pieces are immutable, so
//! concurrent invocations never race.
//!
//! `invoke` is also the single place failures are intercepted. Classification
//! order, first match wins: transport control-flow signals propagate out
//! unchanged; declared errors become their coded response; schema violations
//! become `invalid-input`; everything else is logged and collapsed into the
//! generic `internal-server-error` response.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::config::RouterConfig;
use crate::error::{ActionError, ActionResult};
use crate::logging::{ActionLogger, InvocationId};
use crate::middleware::EmptyContext;
use crate::response::{ActionResponse, GENERIC_ERROR_MESSAGE, Responder, codes};
use crate::transport::Interrupt;

use super::core::ChainCore;
use super::stack::execute_middleware_stack;
use super::types::{BoxedActionHandler, SchemaSlot, StageEntry};

/// An invocable action frozen from a chain.
///
/// Cheap to clone and safe to invoke concurrently; all shared state is
/// immutable after freezing.
pub struct Action<T> {
    stages: Arc<[StageEntry]>,
    schema: Option<SchemaSlot>,
    handler: BoxedActionHandler<T>,
    path: String,
    logger: ActionLogger,
    config: Arc<RouterConfig>,
}

impl<T> Clone for Action<T> {
    fn clone(&self) -> Self {
        Self {
            stages: Arc::clone(&self.stages),
            schema: self.schema.clone(),
            handler: Arc::clone(&self.handler),
            path: self.path.clone(),
            logger: self.logger.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T> std::fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("path", &self.path)
            .field("stages", &self.stages.len())
            .field("has_schema", &self.schema.is_some())
            .finish()
    }
}

impl<T: Send + 'static> Action<T> {
    pub(crate) fn new(core: ChainCore, handler: BoxedActionHandler<T>, path: String) -> Self {
        Self {
            stages: core.stages.into(),
            schema: core.schema,
            handler,
            path,
            logger: core.logger,
            config: core.config,
        }
    }

    /// Rendered action path, for diagnostics.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of frozen middleware stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// True when the chain registered an input schema.
    pub fn has_schema(&self) -> bool {
        self.schema.is_some()
    }

    /// Runs the pipeline against raw parameters.
    ///
    /// Returns the uniform success/error response on the handled path. The
    /// only failures that escape are transport control-flow signals, returned
    /// as `Err` so the hosting transport can act on them.
    pub async fn invoke(&self, params: Value) -> Result<ActionResponse<T>, Interrupt> {
        let invocation = InvocationId::new();
        let started = Instant::now();
        self.logger.debug(format!(
            "invocation {} started at `{}`",
            invocation.short(),
            self.path
        ));

        let cookies = self.config.transport.cookies().await;
        let headers = self.config.transport.headers().await;
        let reply = Responder::new(Arc::clone(&self.config));

        match self.dispatch(params, cookies, headers, reply).await {
            Ok(response) => {
                self.logger.info(format!(
                    "invocation {} completed at `{}` in {}ms",
                    invocation.short(),
                    self.path,
                    started.elapsed().as_millis()
                ));
                Ok(response)
            }
            Err(err) => self.classify(err, invocation),
        }
    }

    async fn dispatch(
        &self,
        params: Value,
        cookies: crate::transport::Cookies,
        headers: crate::transport::Headers,
        reply: Responder,
    ) -> ActionResult<ActionResponse<T>> {
        let context = execute_middleware_stack(
            &self.stages,
            self.schema.as_ref(),
            params,
            cookies,
            headers,
            Box::new(EmptyContext),
        )
        .await?;
        (self.handler)(context, reply).await
    }

    /// Terminal classification, first match wins: interrupts out, declared
    /// errors to their coded response, violations to `invalid-input`, the
    /// rest logged and collapsed into the generic response.
    fn classify(
        &self,
        err: ActionError,
        invocation: InvocationId,
    ) -> Result<ActionResponse<T>, Interrupt> {
        match err {
            ActionError::Interrupt(signal) => {
                self.logger.debug(format!(
                    "invocation {} left `{}` via control-flow signal: {signal}",
                    invocation.short(),
                    self.path
                ));
                Err(signal)
            }
            ActionError::Declared { code, message } => {
                self.logger.info(format!(
                    "invocation {} at `{}` failed with declared error [{code}]",
                    invocation.short(),
                    self.path
                ));
                Ok(ActionResponse::failure(code, message))
            }
            ActionError::Invalid(violation) => {
                self.logger.warn(format!(
                    "invocation {} at `{}` rejected: {violation}",
                    invocation.short(),
                    self.path
                ));
                Ok(ActionResponse::failure(
                    codes::INVALID_INPUT,
                    violation.to_string(),
                ))
            }
            err @ ActionError::Unhandled { .. } => {
                self.logger.error(format!(
                    "invocation {} failed at `{}`: {err}",
                    invocation.short(),
                    self.path
                ));
                Ok(self.generic_failure())
            }
            err @ ActionError::Internal { .. } => {
                self.logger.error(format!(
                    "invocation {} hit an engine defect at `{}`: {err}; please file an issue",
                    invocation.short(),
                    self.path
                ));
                Ok(self.generic_failure())
            }
            other => {
                // A raw error escaped without passing a wrapper.
                let err = ActionError::internal(other.to_string(), self.path.as_str());
                self.logger.error(format!(
                    "invocation {} hit an engine defect at `{}`: {err}; please file an issue",
                    invocation.short(),
                    self.path
                ));
                Ok(self.generic_failure())
            }
        }
    }

    fn generic_failure(&self) -> ActionResponse<T> {
        let message = self
            .config
            .default_message(codes::INTERNAL_SERVER_ERROR)
            .unwrap_or(GENERIC_ERROR_MESSAGE);
        ActionResponse::failure(codes::INTERNAL_SERVER_ERROR, message)
    }
}
