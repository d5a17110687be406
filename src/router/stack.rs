//! The execution engine: context threading and schema placement.
//!
//! [`execute_middleware_stack`] runs a frozen stage list against one
//! invocation's raw parameters. The schema's registration index decides
//! exactly when the parsed value appears in the inputs slot: stages before
//! the index observe `Value::Null`, stages at or after it observe the parsed
//! value, and an index at or past the stage count validates after the last
//! stage so only the handler sees the result.
//!
//! Failures (schema violations, stage errors) propagate out uncaught; the
//! terminal boundary in [`super::Action::invoke`] classifies them.

use serde_json::Value;

use crate::error::ActionResult;
use crate::transport::{Cookies, Headers};

use super::types::{BoxedState, PipelineContext, SchemaSlot, StageEntry};

/// Runs the middleware/validation pipeline to a final context.
///
/// Stages run strictly sequentially: each consumes the previous stage's
/// returned context. The raw parameters are parsed at most once, at the
/// schema's registration index.
pub(crate) async fn execute_middleware_stack(
    stages: &[StageEntry],
    schema: Option<&SchemaSlot>,
    raw: Value,
    cookies: Cookies,
    headers: Headers,
    seed: BoxedState,
) -> ActionResult<PipelineContext> {
    let mut validated = false;
    let mut ctx = PipelineContext {
        state: seed,
        inputs: Value::Null,
        cookies,
        headers,
    };

    if let Some(slot) = schema {
        if slot.index == 0 {
            ctx.inputs = (slot.parse)(raw.clone()).await?;
            validated = true;
        }
    }

    for (i, stage) in stages.iter().enumerate() {
        if let Some(slot) = schema {
            if !validated && i == slot.index {
                ctx.inputs = (slot.parse)(raw.clone()).await?;
                validated = true;
            }
        }
        ctx = (stage.run)(ctx).await?;
    }

    // Schema registered at or past the final stage: validate after the last
    // middleware, before the handler.
    if let Some(slot) = schema {
        if !validated {
            ctx.inputs = (slot.parse)(raw).await?;
        }
    }

    Ok(ctx)
}
