//! Transport collaborator boundary.
//!
//! The pipeline never talks to a real request stack directly. A [`Transport`]
//! supplies read-only cookie and header snapshots for each invocation, and
//! the [`Interrupt`] signals model the transport's control-flow primitives
//! (redirect, not-found) that must escape the pipeline untouched.
//!
//! [`StaticTransport`] is the bundled implementation, useful for tests and
//! for embedding the pipeline where cookies and headers are already known.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

// =============================================================================
// Control-flow signals
// =============================================================================

/// A transport control-flow signal.
///
/// Raising one of these terminates the invocation without producing a
/// response. The terminal boundary recognizes them before any error
/// classification runs and lets them propagate out of the invocable unit
/// unchanged; user code must not swallow them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Interrupt {
    /// Redirect the caller to another location.
    #[error("redirect to `{0}`")]
    Redirect(String),
    /// The requested resource does not exist.
    #[error("not found")]
    NotFound,
}

impl Interrupt {
    /// True for the redirect signal.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    /// True for the not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Redirect target, when this is a redirect.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Redirect(target) => Some(target),
            Self::NotFound => None,
        }
    }
}

// =============================================================================
// Read-only request views
// =============================================================================

/// Read-only cookie snapshot for one invocation.
///
/// Lookups are case-sensitive, matching how cookie names behave in the wild.
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    values: Arc<HashMap<String, String>>,
}

impl Cookies {
    /// An empty cookie jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Arc::new(values),
        }
    }

    /// Looks up a cookie by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of cookies in the snapshot.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the snapshot holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read-only header snapshot for one invocation.
///
/// Header names are case-insensitive; keys are normalized to lowercase at
/// construction and lookups are lowercased before matching.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    values: Arc<HashMap<String, String>>,
}

impl Headers {
    /// An empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from name/value pairs, normalizing names.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
            .collect();
        Self {
            values: Arc::new(values),
        }
    }

    /// Looks up a header by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Number of headers in the snapshot.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the snapshot holds no headers.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Transport trait
// =============================================================================

/// Supplies per-invocation request data to the pipeline.
///
/// Implementations bridge to whatever hosts the actions. Both accessors are
/// async because real transports often resolve request state lazily; the
/// snapshots they return are taken once per invocation and shared with every
/// stage.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Cookie snapshot for the current invocation.
    async fn cookies(&self) -> Cookies;

    /// Header snapshot for the current invocation.
    async fn headers(&self) -> Headers;
}

/// A [`Transport`] backed by fixed cookie and header maps.
#[derive(Debug, Clone, Default)]
pub struct StaticTransport {
    cookies: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

impl StaticTransport {
    /// An empty transport (no cookies, no headers).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cookie to every invocation's snapshot.
    #[must_use = "builder methods return the updated transport"]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Adds a header to every invocation's snapshot.
    #[must_use = "builder methods return the updated transport"]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn cookies(&self) -> Cookies {
        Cookies::from_pairs(self.cookies.iter().cloned())
    }

    async fn headers(&self) -> Headers {
        Headers::from_pairs(self.headers.iter().cloned())
    }
}
