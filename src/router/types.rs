//! Erased plumbing shared by the chain builders and the execution engine.
//!
//! Stages, the schema, and the terminal handler are stored type-erased so a
//! single stage list can hold heterogeneous middleware. The typed builder
//! handles ([`super::ActionRouter`]) guarantee at compile time that adjacent
//! stages agree on their context types; the erased layer only moves
//! `Box<dyn Any>` state between them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::ActionResult;
use crate::response::{ActionResponse, Responder};
use crate::transport::{Cookies, Headers};

/// Type-erased context state moved from stage to stage.
pub(crate) type BoxedState = Box<dyn Any + Send>;

/// The threaded execution state of one in-flight invocation.
///
/// Owned exclusively by that invocation: stages consume it and return the
/// next state, and the final instance is handed to the terminal handler.
pub(crate) struct PipelineContext {
    /// Current type-erased context value.
    pub state: BoxedState,
    /// Inputs slot, `Value::Null` until the schema has run.
    pub inputs: Value,
    /// Cookie snapshot shared across the invocation.
    pub cookies: Cookies,
    /// Header snapshot shared across the invocation.
    pub headers: Headers,
}

impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// An erased, wrapped middleware stage.
pub(crate) type BoxedStage =
    Arc<dyn Fn(PipelineContext) -> BoxFuture<'static, ActionResult<PipelineContext>> + Send + Sync>;

/// One entry of a chain's stage list.
#[derive(Clone)]
pub(crate) struct StageEntry {
    /// The wrapped stage, classification applied around the user middleware.
    pub run: BoxedStage,
}

/// Erased schema parse returning the inputs-slot value.
pub(crate) type BoxedParse =
    Arc<dyn Fn(Value) -> BoxFuture<'static, ActionResult<Value>> + Send + Sync>;

/// The at-most-one validation schema of a chain and where it sits.
#[derive(Clone)]
pub(crate) struct SchemaSlot {
    /// Erased parse capability; the schema itself is immutable once set, so
    /// branches share it.
    pub parse: BoxedParse,
    /// 0-based middleware index recorded at registration. Decides when the
    /// parsed value becomes visible during execution.
    pub index: usize,
}

/// An erased, wrapped terminal handler producing the typed response.
pub(crate) type BoxedActionHandler<T> = Arc<
    dyn Fn(PipelineContext, Responder) -> BoxFuture<'static, ActionResult<ActionResponse<T>>>
        + Send
        + Sync,
>;
