//! Structured logging for chain construction and invocation.
//!
//! Every chain owns an [`ActionLogger`]: a thin, clonable gate in front of the
//! `tracing` macros. The configured [`LogLevels`] set decides which levels are
//! emitted at all, and every line carries the chain name as a structured
//! field. Logging is diagnostics only; nothing in the engine depends on it.
//!
//! [`InvocationId`] correlates the log lines of a single invocation. It uses
//! UUID v7 so identifiers sort by creation time.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Number of characters in the short form of an [`InvocationId`].
const SHORT_ID_LENGTH: usize = 8;

// =============================================================================
// Levels
// =============================================================================

/// A single log level tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose construction and execution detail.
    Debug,
    /// Lifecycle messages (default on).
    Info,
    /// Suspicious but recoverable situations (default on).
    Warn,
    /// Failures (default on).
    Error,
}

impl LogLevel {
    /// Stable tag used in configuration and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Maps this level onto a `tracing::Level`.
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of enabled log levels for one chain.
///
/// The default set enables `info`, `warn`, and `error`; `debug` is opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLevels {
    /// Whether `debug` lines are emitted.
    pub debug: bool,
    /// Whether `info` lines are emitted.
    pub info: bool,
    /// Whether `warn` lines are emitted.
    pub warn: bool,
    /// Whether `error` lines are emitted.
    pub error: bool,
}

impl Default for LogLevels {
    fn default() -> Self {
        Self {
            debug: false,
            info: true,
            warn: true,
            error: true,
        }
    }
}

impl LogLevels {
    /// The default set: `info`, `warn`, and `error`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every level enabled.
    pub fn all() -> Self {
        Self {
            debug: true,
            info: true,
            warn: true,
            error: true,
        }
    }

    /// Every level disabled.
    pub fn none() -> Self {
        Self {
            debug: false,
            info: false,
            warn: false,
            error: false,
        }
    }

    /// Builds a set from a list of level tags; unlisted levels stay off.
    pub fn from_levels<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = LogLevel>,
    {
        levels.into_iter().fold(Self::none(), Self::with)
    }

    /// Returns the set with one more level enabled.
    #[must_use = "This method returns a new LogLevels and does not modify self"]
    pub fn with(mut self, level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => self.debug = true,
            LogLevel::Info => self.info = true,
            LogLevel::Warn => self.warn = true,
            LogLevel::Error => self.error = true,
        }
        self
    }

    /// Returns the set with one level disabled.
    #[must_use = "This method returns a new LogLevels and does not modify self"]
    pub fn without(mut self, level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => self.debug = false,
            LogLevel::Info => self.info = false,
            LogLevel::Warn => self.warn = false,
            LogLevel::Error => self.error = false,
        }
        self
    }

    /// True when the given level is enabled.
    pub fn enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Debug => self.debug,
            LogLevel::Info => self.info,
            LogLevel::Warn => self.warn,
            LogLevel::Error => self.error,
        }
    }
}

// =============================================================================
// Invocation correlation
// =============================================================================

/// Unique identifier for one invocation of an action.
///
/// UUID v7 includes a timestamp component, so identifiers sort by creation
/// time, which keeps interleaved log output readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(uuid::Uuid);

impl InvocationId {
    /// Creates a fresh identifier.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)))
    }

    /// Short form for compact log output.
    pub fn short(&self) -> String {
        self.0.to_string().chars().take(SHORT_ID_LENGTH).collect()
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for InvocationId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

// =============================================================================
// Logger
// =============================================================================

/// Level-gated logger attached to a chain.
///
/// Cloning is cheap; branches and frozen actions share the same logger. The
/// chain name appears as a structured `chain` field on every line.
#[derive(Debug, Clone)]
pub struct ActionLogger {
    name: Arc<str>,
    levels: LogLevels,
}

impl ActionLogger {
    /// Creates a logger for the named chain with the given level set.
    pub fn new(name: impl AsRef<str>, levels: LogLevels) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            levels,
        }
    }

    /// Name of the chain this logger belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the given level is enabled.
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.levels.enabled(level)
    }

    /// Emits a `debug` line if the level is enabled.
    pub fn debug(&self, message: impl fmt::Display) {
        if self.levels.debug {
            tracing::debug!(chain = %self.name, "{}", message);
        }
    }

    /// Emits an `info` line if the level is enabled.
    pub fn info(&self, message: impl fmt::Display) {
        if self.levels.info {
            tracing::info!(chain = %self.name, "{}", message);
        }
    }

    /// Emits a `warn` line if the level is enabled.
    pub fn warn(&self, message: impl fmt::Display) {
        if self.levels.warn {
            tracing::warn!(chain = %self.name, "{}", message);
        }
    }

    /// Emits an `error` line if the level is enabled.
    pub fn error(&self, message: impl fmt::Display) {
        if self.levels.error {
            tracing::error!(chain = %self.name, "{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_has_debug_off() {
        let levels = LogLevels::default();
        assert!(!levels.enabled(LogLevel::Debug));
        assert!(levels.enabled(LogLevel::Info));
        assert!(levels.enabled(LogLevel::Warn));
        assert!(levels.enabled(LogLevel::Error));
    }

    #[test]
    fn with_and_without_toggle_single_levels() {
        let levels = LogLevels::none()
            .with(LogLevel::Error)
            .with(LogLevel::Debug)
            .without(LogLevel::Error);
        assert!(levels.enabled(LogLevel::Debug));
        assert!(!levels.enabled(LogLevel::Error));
        assert!(!levels.enabled(LogLevel::Info));
    }

    #[test]
    fn from_levels_enables_only_listed_tags() {
        let levels = LogLevels::from_levels([LogLevel::Warn, LogLevel::Error]);
        assert!(!levels.enabled(LogLevel::Debug));
        assert!(!levels.enabled(LogLevel::Info));
        assert!(levels.enabled(LogLevel::Warn));
        assert!(levels.enabled(LogLevel::Error));
    }

    #[test]
    fn level_tags_are_stable() {
        assert_eq!(LogLevel::Debug.as_str(), "debug");
        assert_eq!(LogLevel::Info.as_str(), "info");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::Error.as_str(), "error");
    }

    #[test]
    fn level_tags_serialize_lowercase() {
        assert_eq!(
            serde_json::to_value(LogLevel::Warn).unwrap(),
            serde_json::json!("warn")
        );
    }

    #[test]
    fn invocation_ids_are_unique_and_short_form_is_prefix() {
        let a = InvocationId::new();
        let b = InvocationId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
        assert!(a.to_string().starts_with(&a.short()));
    }

    #[test]
    fn logger_reports_enabled_levels() {
        let logger = ActionLogger::new("root", LogLevels::none().with(LogLevel::Error));
        assert_eq!(logger.name(), "root");
        assert!(logger.enabled(LogLevel::Error));
        assert!(!logger.enabled(LogLevel::Info));
        // Emission with disabled levels must be a no-op, not a panic.
        logger.debug("construction detail");
        logger.error("failure detail");
    }
}
