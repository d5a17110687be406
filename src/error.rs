//! Error taxonomy for the action pipeline.
//!
//! Failures flowing through a pipeline fall into a small set of kinds with
//! very different handling at the terminal boundary:
//!
//! - [`ActionError::Internal`] marks a defect in the engine itself, such as a
//!   context type mismatch across the erased stage boundary.
//! - [`ActionError::Unhandled`] wraps an error that escaped user middleware
//!   or handler code without being declared, tagged with where it happened.
//! - [`ActionError::Declared`] is a failure the developer raised on purpose,
//!   carrying an application error code and message.
//! - [`ActionError::Invalid`] carries a schema violation for rejected input.
//! - [`ActionError::Interrupt`] carries a transport control-flow signal,
//!   which is never converted into a response.
//!
//! Everything else travels as [`ActionError::Other`] until a wrapper or the
//! terminal boundary classifies it.

use std::fmt;

use thiserror::Error;

use crate::schema::SchemaViolation;
use crate::transport::Interrupt;

/// Boxed error type used for wrapped causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias used by middleware, handlers, and the engine.
pub type ActionResult<T> = Result<T, ActionError>;

/// Distinguishes which wrapper caught an undeclared error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnhandledKind {
    /// The error escaped a middleware stage.
    Middleware,
    /// The error escaped the terminal handler.
    Handler,
}

impl UnhandledKind {
    /// Stable tag used in logs and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Middleware => "MiddlewareError",
            Self::Handler => "ActionHandlerError",
        }
    }
}

impl fmt::Display for UnhandledKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The failure union threaded through every pipeline result.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActionError {
    /// Defect inside the pipeline engine itself. Not produced by user code;
    /// always logged with a request to file an issue.
    #[error("internal error at `{path}`: {message}")]
    Internal {
        /// What went wrong.
        message: String,
        /// Rendered action path where the defect surfaced.
        path: String,
    },

    /// An error that escaped user middleware or handler code undeclared.
    #[error("{kind} at `{path}`: {source}")]
    Unhandled {
        /// Which wrapper caught it.
        kind: UnhandledKind,
        /// Rendered action path captured when the stage was registered.
        path: String,
        /// The original escaping error.
        #[source]
        source: BoxError,
    },

    /// A failure the developer explicitly raised with an application code.
    /// The terminal boundary converts it into the standard error response
    /// using exactly this code and message.
    #[error("[{code}] {message}")]
    Declared {
        /// Application-defined error code.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// Input rejected by the validation schema.
    #[error(transparent)]
    Invalid(#[from] SchemaViolation),

    /// Transport control-flow signal. Propagates out of the invocable unit
    /// unchanged instead of becoming a response.
    #[error(transparent)]
    Interrupt(#[from] Interrupt),

    /// A raw error that has not passed through a wrapper yet.
    #[error("{0}")]
    Other(#[source] BoxError),
}

impl ActionError {
    /// Builds an engine-defect error.
    pub fn internal(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Wraps an escaping error with its origin kind and path.
    pub fn unhandled(
        kind: UnhandledKind,
        path: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Unhandled {
            kind,
            path: path.into(),
            source: source.into(),
        }
    }

    /// Builds a developer-declared failure.
    pub fn declared(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Declared {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Carries an arbitrary error into the pipeline for later classification.
    pub fn other(source: impl Into<BoxError>) -> Self {
        Self::Other(source.into())
    }

    /// True for engine defects.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// True for wrapped undeclared errors.
    pub fn is_unhandled(&self) -> bool {
        matches!(self, Self::Unhandled { .. })
    }

    /// True for developer-declared failures.
    pub fn is_declared(&self) -> bool {
        matches!(self, Self::Declared { .. })
    }

    /// True for schema violations.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// True for transport control-flow signals.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupt(_))
    }

    /// Application code of a declared failure.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Declared { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Action path recorded on the kinds the engine constructs.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Internal { path, .. } | Self::Unhandled { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
