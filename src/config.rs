//! Configuration surface consumed at chain construction time.
//!
//! A [`RouterConfig`] names the root chain, selects the enabled log levels,
//! maps application error codes to their default messages, and supplies the
//! transport collaborator. The configuration is shared by `Arc` across every
//! branch and frozen action of a chain lineage and never mutated afterwards.
//!
//! # Example
//! ```rust,ignore
//! use action_router::{RouterConfig, LogLevels, StaticTransport};
//!
//! let config = RouterConfig::new()
//!     .with_name("billing")
//!     .with_logging(LogLevels::all())
//!     .with_error_code("unauthorized", "Access denied")
//!     .with_transport(StaticTransport::new().with_header("x-tenant", "acme"));
//! config.validate()?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::logging::LogLevels;
use crate::transport::{StaticTransport, Transport};

/// Name given to chains built without an explicit one.
pub const DEFAULT_CHAIN_NAME: &str = "root";

/// Build-time configuration failure, distinct from the runtime taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The chain name is empty.
    #[error("chain name cannot be empty")]
    EmptyName,
    /// An error-code key is empty.
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    /// A configured code maps to an empty default message.
    #[error("default message for error code `{0}` cannot be empty")]
    EmptyDefaultMessage(String),
    /// `input` was called on a chain that already carries a schema.
    #[error("a schema is already registered on this chain")]
    SchemaAlreadyRegistered,
}

/// Configuration for a chain lineage.
#[derive(Clone)]
pub struct RouterConfig {
    /// Root identifier, seeding the action path (default: [`DEFAULT_CHAIN_NAME`]).
    pub name: String,
    /// Enabled log levels (default: `info`, `warn`, `error`).
    pub logging: LogLevels,
    /// Application error codes mapped to their default messages.
    pub error_codes: HashMap<String, String>,
    /// Transport collaborator supplying cookies, headers, and control-flow
    /// signals (default: an empty [`StaticTransport`]).
    pub transport: Arc<dyn Transport>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CHAIN_NAME.to_string(),
            logging: LogLevels::default(),
            error_codes: HashMap::new(),
            transport: Arc::new(StaticTransport::new()),
        }
    }
}

impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("name", &self.name)
            .field("logging", &self.logging)
            .field("error_codes", &self.error_codes)
            .field("transport", &"<dyn Transport>")
            .finish()
    }
}

impl RouterConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chain name.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the enabled log levels.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_logging(mut self, logging: LogLevels) -> Self {
        self.logging = logging;
        self
    }

    /// Registers an error code with its default message.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_error_code(
        mut self,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.error_codes.insert(code.into(), message.into());
        self
    }

    /// Registers several error codes at once.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_error_codes<I, K, V>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.error_codes
            .extend(codes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the transport collaborator.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Default message configured for a code, if any.
    pub fn default_message(&self, code: &str) -> Option<&str> {
        self.error_codes.get(code).map(String::as_str)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, any error-code key is empty, or
    /// any default message is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        for (code, message) in &self.error_codes {
            if code.trim().is_empty() {
                return Err(ConfigError::EmptyErrorCode);
            }
            if message.trim().is_empty() {
                return Err(ConfigError::EmptyDefaultMessage(code.clone()));
            }
        }
        Ok(())
    }
}
