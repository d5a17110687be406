//! The uniform success/error result and the per-invocation responder.
//!
//! Every handled invocation produces an [`ActionResponse`]: either
//! `{"success":true,"data":...}` or
//! `{"success":false,"error":{"code":...,"message":...}}`. The wire shape is
//! part of the contract, so serialization is implemented by hand rather than
//! derived.
//!
//! A [`Responder`] is constructed per invocation and handed to the handler.
//! It builds responses using the chain's configured error-code map and exposes
//! the transport control-flow signals as errors the handler raises with `Err`.

use std::fmt;
use std::sync::Arc;

use serde::de::{Deserializer, Error as DeError};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::config::RouterConfig;
use crate::error::ActionError;
use crate::transport::Interrupt;

/// Error codes the engine itself produces.
pub mod codes {
    /// Code attached to every failure the caller did not declare.
    pub const INTERNAL_SERVER_ERROR: &str = "internal-server-error";
    /// Code attached to schema validation failures.
    pub const INVALID_INPUT: &str = "invalid-input";
}

/// Message used when no default is configured for a code.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

// =============================================================================
// Response
// =============================================================================

/// Error payload of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Application-defined error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// The tagged success/error result of one invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResponse<T> {
    /// The handled path succeeded.
    Success {
        /// Handler payload.
        data: T,
    },
    /// The invocation failed with a coded error.
    Failure {
        /// Code and message surfaced to the caller.
        error: ErrorBody,
    },
}

impl<T> ActionResponse<T> {
    /// Builds a success response.
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    /// Builds an error response.
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    /// True for the success arm.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// True for the failure arm.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Payload of a success response.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Error body of a failed response.
    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Consumes the response, yielding the payload if it succeeded.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }
}

impl<T: Serialize> Serialize for ActionResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { data } => {
                let mut state = serializer.serialize_struct("ActionResponse", 2)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.end()
            }
            Self::Failure { error } => {
                let mut state = serializer.serialize_struct("ActionResponse", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ActionResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(bound(deserialize = "T: Deserialize<'de>"))]
        struct Wire<T> {
            success: bool,
            #[serde(default)]
            data: Option<T>,
            #[serde(default)]
            error: Option<ErrorBody>,
        }

        let wire = Wire::<T>::deserialize(deserializer)?;
        match (wire.success, wire.data, wire.error) {
            (true, Some(data), _) => Ok(Self::Success { data }),
            (false, _, Some(error)) => Ok(Self::Failure { error }),
            (true, None, _) => Err(D::Error::missing_field("data")),
            (false, _, None) => Err(D::Error::missing_field("error")),
        }
    }
}

// =============================================================================
// Responder
// =============================================================================

/// Response helper scoped to one invocation.
///
/// Handed to the terminal handler alongside the final context. Error codes
/// registered in the chain configuration resolve to their default messages;
/// ad hoc codes require an explicit message via [`Responder::create_error`].
#[derive(Debug, Clone)]
pub struct Responder {
    config: Arc<RouterConfig>,
}

impl Responder {
    pub(crate) fn new(config: Arc<RouterConfig>) -> Self {
        Self { config }
    }

    /// Builds a success response around the payload.
    pub fn data<T>(&self, payload: T) -> ActionResponse<T> {
        ActionResponse::success(payload)
    }

    /// Builds an error response using the code's configured default message.
    ///
    /// A code missing from the configuration falls back to
    /// [`GENERIC_ERROR_MESSAGE`] and logs a warning; call sites needing an
    /// unregistered code should use [`Responder::create_error`] instead.
    pub fn error<T>(&self, code: impl Into<String>) -> ActionResponse<T> {
        let code = code.into();
        match self.config.default_message(&code) {
            Some(message) => ActionResponse::failure(code, message),
            None => {
                tracing::warn!(
                    chain = %self.config.name,
                    code = %code,
                    "no default message configured for error code, using the generic message"
                );
                ActionResponse::failure(code, GENERIC_ERROR_MESSAGE)
            }
        }
    }

    /// Builds an error response for a configured code with an explicit
    /// message overriding its default.
    pub fn error_with<T>(
        &self,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> ActionResponse<T> {
        ActionResponse::failure(code, message)
    }

    /// Builds an error response for an ad hoc code. No registration is
    /// required; the message is mandatory.
    pub fn create_error<T>(
        &self,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> ActionResponse<T> {
        ActionResponse::failure(code, message)
    }

    /// Signals a redirect. Raise the returned value with `Err`; it leaves the
    /// invocable unit unchanged instead of becoming a response.
    pub fn redirect(&self, target: impl Into<String>) -> ActionError {
        ActionError::from(Interrupt::Redirect(target.into()))
    }

    /// Signals that the requested resource does not exist. Raise the returned
    /// value with `Err`.
    pub fn not_found(&self) -> ActionError {
        ActionError::from(Interrupt::NotFound)
    }
}

impl<T: fmt::Debug> fmt::Display for ActionResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { data } => write!(f, "success: {:?}", data),
            Self::Failure { error } => write!(f, "error [{}]: {}", error.code, error.message),
        }
    }
}
