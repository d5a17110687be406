#![warn(missing_docs)]
//! # Action Router
//!
//! A type-safe pipeline builder for server-side actions.
//!
//! ## Overview
//!
//! An action is an ordered pipeline: middleware stages that enrich a typed
//! context, at most one input-validation schema, and a terminal handler.
//! Freezing the pipeline with `run` yields an [`Action`], an immutable unit
//! invoked with raw JSON parameters that always answers in the uniform
//! `{"success":true,"data":...}` / `{"success":false,"error":{...}}` shape.
//!
//! - **Typed context threading**: every middleware stage narrows the chain to
//!   its declared output context, checked at compile time
//! - **One schema per chain**: validated inputs reach the handler typed;
//!   stages registered before the schema see JSON `null`
//! - **Copy-on-branch**: forked chains share nothing that can grow, so
//!   sibling registrations never leak across branches
//! - **Single error boundary**: every failure is classified exactly once, at
//!   `invoke`, into a coded error response
//!
//! ## Architecture
//!
//! ```text
//!                 invoke(params)
//!                       │
//!                       ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                   Action                            │
//! │  ┌───────────┐  ┌───────────┐       ┌───────────┐   │
//! │  │ stage 0   │─▶│ stage 1   │─ ... ─▶│ stage n-1 │  │
//! │  └───────────┘  └───────────┘       └───────────┘   │
//! │        ▲ schema parses at its registration index    │
//! │        │                                            │
//! │  ┌───────────┐     ┌──────────────────────────────┐ │
//! │  │  schema   │     │          handler             │ │
//! │  └───────────┘     └──────────────┬───────────────┘ │
//! │                                   │                 │
//! │              terminal boundary    ▼                 │
//! │  interrupts ◀── classify ──▶ ActionResponse         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use action_router::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! struct AuthContext {
//!     user_id: String,
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct CreateNote {
//!     title: String,
//! }
//!
//! let action = ActionRouter::with_config(
//!     RouterConfig::new()
//!         .with_name("notes")
//!         .with_error_code("unauthorized", "Access denied"),
//! )
//! .use_middleware_named("auth", |request: StageRequest<EmptyContext>| async move {
//!     match request.cookies.get("session") {
//!         Some(session) => Ok(AuthContext { user_id: session.to_string() }),
//!         None => Err(reply_unauthorized()),
//!     }
//! })
//! .input(SerdeSchema::<CreateNote>::new())?
//! .run(|request: ActionRequest<AuthContext, CreateNote>, reply: Responder| async move {
//!     let note = store(&request.context.user_id, request.inputs.title).await?;
//!     Ok(reply.data(note))
//! });
//!
//! let response = action.invoke(json!({"title": "groceries"})).await?;
//! ```
//!
//! ## Branching
//!
//! `branch` forks a chain without touching the original; each side grows
//! independently while sharing configuration:
//!
//! ```rust,ignore
//! let base = ActionRouter::new().use_middleware_named("auth", authenticate);
//!
//! let read = base.branch().run(list_notes);
//! let write = base
//!     .branch()
//!     .use_middleware_named("admin", require_admin)
//!     .input(SerdeSchema::<CreateNote>::new())?
//!     .run(create_note);
//! ```
//!
//! ## Error Handling
//!
//! Failures raised anywhere in the pipeline are classified once, at
//! `invoke`:
//!
//! ```rust,ignore
//! // Declared: surfaced to the caller with its exact code and message.
//! Err(ActionError::declared("forbidden", "admin role required"))
//!
//! // Schema violations become the `invalid-input` error response.
//! // Everything else collapses into `internal-server-error`.
//!
//! // Control-flow signals skip classification and leave invoke as Err.
//! Err(reply.redirect("/login"))
//! Err(reply.not_found())
//! ```
//!
//! ## Module Structure
//!
//! - [`ActionRouter`] / [`ValidatedActionRouter`] - chain builders
//! - [`Action`] - the frozen, invocable pipeline
//! - [`Middleware`] / [`ActionHandler`] - the user-code traits
//! - [`InputSchema`] - the validation collaborator, with [`SerdeSchema`] and
//!   [`ValidatedSchema`] bundled
//! - [`Transport`] - per-invocation cookies, headers, and control-flow signals
//! - [`RouterConfig`] - naming, log levels, and the error-code map
//!
//! ## Prelude
//!
//! ```rust,ignore
//! use action_router::prelude::*;
//! ```

mod config;
mod error;
mod handler;
mod logging;
mod middleware;
mod path;
mod response;
mod router;
mod schema;
mod transport;

#[cfg(test)]
mod tests;

// Public API
pub use config::{ConfigError, DEFAULT_CHAIN_NAME, RouterConfig};
pub use error::{ActionError, ActionResult, BoxError, UnhandledKind};
pub use handler::{ActionHandler, ActionRequest};
pub use logging::{ActionLogger, InvocationId, LogLevel, LogLevels};
pub use middleware::{EmptyContext, Middleware, StageRequest};
pub use path::{ActionPath, PathSegment};
pub use response::{
    ActionResponse, ErrorBody, GENERIC_ERROR_MESSAGE, Responder, codes,
};
pub use router::{Action, ActionRouter, RunOptions, ValidatedActionRouter};
pub use schema::{
    FieldViolation, InputSchema, RuleSet, SchemaViolation, SerdeSchema, Validate, ValidatedSchema,
};
pub use transport::{Cookies, Headers, Interrupt, StaticTransport, Transport};

/// Prelude for convenient imports
///
/// ```rust,ignore
/// use action_router::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Action,
        ActionError,
        ActionHandler,
        ActionRequest,
        ActionResponse,
        ActionResult,
        ActionRouter,
        EmptyContext,
        InputSchema,
        Interrupt,
        Middleware,
        Responder,
        RouterConfig,
        RuleSet,
        RunOptions,
        SchemaViolation,
        SerdeSchema,
        StageRequest,
        StaticTransport,
        Transport,
        Validate,
        ValidatedActionRouter,
        ValidatedSchema,
    };
}
