//! Chain builders: the typed handles over the erased stage list.
//!
//! [`ActionRouter`] is the open chain: it accepts middleware, at most one
//! schema, branching, and the terminal `run`. Registering a schema moves the
//! handle to [`ValidatedActionRouter`], whose surface deliberately has no
//! `use_middleware` or `branch`, so the schema always sits after every stage
//! on chains built through the public API. The execution engine itself
//! supports any schema position (see [`super::stack`]).

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::{ConfigError, RouterConfig};
use crate::handler::ActionHandler;
use crate::logging::ActionLogger;
use crate::middleware::{EmptyContext, Middleware};
use crate::path::ActionPath;
use crate::schema::InputSchema;

use super::action::Action;
use super::types::{BoxedParse, SchemaSlot, StageEntry};
use super::wrapper::{wrap_handler, wrap_stage};

// =============================================================================
// Run options
// =============================================================================

/// Options for the terminal `run` operation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    name: Option<String>,
}

impl RunOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the action; the name is appended to the action path for
    /// diagnostics.
    #[must_use = "This method returns a new RunOptions and does not modify self"]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// =============================================================================
// Shared chain state
// =============================================================================

/// The untyped state behind every chain handle.
pub(crate) struct ChainCore {
    pub(crate) stages: Vec<StageEntry>,
    pub(crate) schema: Option<SchemaSlot>,
    pub(crate) path: ActionPath,
    pub(crate) logger: ActionLogger,
    pub(crate) config: Arc<RouterConfig>,
}

impl ChainCore {
    fn new(config: RouterConfig) -> Self {
        let path = ActionPath::new(&config.name);
        let logger = ActionLogger::new(&config.name, config.logging);
        Self {
            stages: Vec::new(),
            schema: None,
            path,
            logger,
            config: Arc::new(config),
        }
    }

    /// Copy-on-branch: the stage list is copied (entries shared by `Arc`),
    /// the schema slot and configuration are shared, and the path gains a
    /// branch marker.
    fn branch(&self) -> Self {
        let mut path = self.path.clone();
        path.push_branch();
        Self {
            stages: self.stages.clone(),
            schema: self.schema.clone(),
            path,
            logger: self.logger.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

/// Freezes a chain into an invocable action.
fn freeze<C, I, H>(mut core: ChainCore, handler: H, options: RunOptions) -> Action<H::Data>
where
    C: Send + 'static,
    I: DeserializeOwned + Send + 'static,
    H: ActionHandler<C, I>,
{
    if let Some(name) = options.name {
        core.path.push_common(name);
    }
    let path = core.path.render();
    core.logger.debug(format!(
        "chain `{path}` frozen into an action with {} stage(s)",
        core.stages.len()
    ));
    let handler = wrap_handler::<C, I, H>(handler, path.clone());
    Action::new(core, handler, path)
}

// =============================================================================
// Open chain
// =============================================================================

/// A configurable chain of middleware stages.
///
/// The type parameter tracks the context type the *next* registration will
/// receive; every `use_middleware` returns the handle narrowed to the stage's
/// declared output context.
///
/// # Example
/// ```rust,ignore
/// let action = ActionRouter::new()
///     .use_middleware_named("auth", authenticate)
///     .input(SerdeSchema::<CreateUser>::new())?
///     .run(create_user);
///
/// let response = action.invoke(json!({"name": "Ada"})).await?;
/// ```
pub struct ActionRouter<C> {
    core: ChainCore,
    _context: PhantomData<fn() -> C>,
}

impl ActionRouter<EmptyContext> {
    /// Creates a chain with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Creates a chain with an explicit configuration.
    pub fn with_config(config: RouterConfig) -> Self {
        let core = ChainCore::new(config);
        core.logger
            .debug(format!("chain `{}` created", core.path.render()));
        Self {
            core,
            _context: PhantomData,
        }
    }
}

impl Default for ActionRouter<EmptyContext> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + 'static> ActionRouter<C> {
    /// Appends a middleware stage, narrowing the chain to its output context.
    #[must_use = "This method returns the extended chain and does not modify self"]
    pub fn use_middleware<M>(self, middleware: M) -> ActionRouter<M::Output>
    where
        M: Middleware<C>,
    {
        self.register(None, middleware)
    }

    /// Appends a named middleware stage. The name (case-normalized) joins
    /// the action path for diagnostics.
    #[must_use = "This method returns the extended chain and does not modify self"]
    pub fn use_middleware_named<M>(self, name: &str, middleware: M) -> ActionRouter<M::Output>
    where
        M: Middleware<C>,
    {
        self.register(Some(name), middleware)
    }

    fn register<M>(mut self, name: Option<&str>, middleware: M) -> ActionRouter<M::Output>
    where
        M: Middleware<C>,
    {
        if let Some(name) = name {
            self.core.path.push_common(name);
        }
        let path = self.core.path.render();
        let index = self.core.stages.len();
        self.core
            .logger
            .debug(format!("registered middleware stage {index} at `{path}`"));
        self.core.stages.push(wrap_stage::<C, M>(middleware, path));
        ActionRouter {
            core: self.core,
            _context: PhantomData,
        }
    }

    /// Registers the input-validation schema at the current position.
    ///
    /// The returned handle accepts no further `use_middleware` or `branch`;
    /// validated inputs become visible to the handler only.
    ///
    /// # Errors
    ///
    /// [`ConfigError::SchemaAlreadyRegistered`] if this chain already carries
    /// a schema.
    pub fn input<S>(mut self, schema: S) -> Result<ValidatedActionRouter<C, S::Parsed>, ConfigError>
    where
        S: InputSchema + 'static,
    {
        if self.core.schema.is_some() {
            return Err(ConfigError::SchemaAlreadyRegistered);
        }
        let index = self.core.stages.len();
        self.core.logger.debug(format!(
            "registered input schema at index {index} on `{}`",
            self.core.path.render()
        ));
        let schema = Arc::new(schema);
        let parse: BoxedParse = Arc::new(move |raw| {
            let schema = Arc::clone(&schema);
            Box::pin(async move {
                let parsed = schema.parse(raw).await?;
                Ok(serde_json::to_value(parsed)?)
            })
        });
        self.core.schema = Some(SchemaSlot { parse, index });
        Ok(ValidatedActionRouter {
            core: self.core,
            _types: PhantomData,
        })
    }

    /// Forks the chain. The child owns a copy of the stage list, so later
    /// registrations on either side never appear in the other; configuration
    /// and logger are shared.
    #[must_use = "branch returns the forked chain and leaves self untouched"]
    pub fn branch(&self) -> ActionRouter<C> {
        let core = self.core.branch();
        core.logger
            .debug(format!("chain branched at `{}`", core.path.render()));
        ActionRouter {
            core,
            _context: PhantomData,
        }
    }

    /// Freezes the chain into an invocable [`Action`].
    #[must_use = "run returns the invocable action"]
    pub fn run<H>(self, handler: H) -> Action<H::Data>
    where
        H: ActionHandler<C, serde_json::Value>,
    {
        self.run_with(handler, RunOptions::default())
    }

    /// Freezes the chain into an invocable [`Action`] with options.
    #[must_use = "run_with returns the invocable action"]
    pub fn run_with<H>(self, handler: H, options: RunOptions) -> Action<H::Data>
    where
        H: ActionHandler<C, serde_json::Value>,
    {
        freeze::<C, serde_json::Value, H>(self.core, handler, options)
    }
}

// =============================================================================
// Validated chain
// =============================================================================

/// A chain carrying its input-validation schema.
///
/// Only the terminal operations remain: the absence of `use_middleware` and
/// `branch` on this handle is what keeps the schema position fixed after
/// registration.
pub struct ValidatedActionRouter<C, I> {
    core: ChainCore,
    _types: PhantomData<fn() -> (C, I)>,
}

impl<C, I> fmt::Debug for ValidatedActionRouter<C, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedActionRouter")
            .field("path", &self.core.path.render())
            .finish_non_exhaustive()
    }
}

impl<C, I> ValidatedActionRouter<C, I>
where
    C: Send + 'static,
    I: DeserializeOwned + Send + 'static,
{
    /// Always fails: a chain carries at most one schema.
    ///
    /// # Errors
    ///
    /// [`ConfigError::SchemaAlreadyRegistered`], unconditionally.
    pub fn input<S>(self, _schema: S) -> Result<ValidatedActionRouter<C, S::Parsed>, ConfigError>
    where
        S: InputSchema + 'static,
    {
        self.core.logger.warn(format!(
            "rejected second input schema on `{}`",
            self.core.path.render()
        ));
        Err(ConfigError::SchemaAlreadyRegistered)
    }

    /// Freezes the chain into an invocable [`Action`].
    #[must_use = "run returns the invocable action"]
    pub fn run<H>(self, handler: H) -> Action<H::Data>
    where
        H: ActionHandler<C, I>,
    {
        self.run_with(handler, RunOptions::default())
    }

    /// Freezes the chain into an invocable [`Action`] with options.
    #[must_use = "run_with returns the invocable action"]
    pub fn run_with<H>(self, handler: H, options: RunOptions) -> Action<H::Data>
    where
        H: ActionHandler<C, I>,
    {
        freeze::<C, I, H>(self.core, handler, options)
    }
}
