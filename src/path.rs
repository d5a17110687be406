//! Action path tracking.
//!
//! Every chain carries a breadcrumb trail of where it came from: the root
//! name it was configured with, the names of middleware registered with a
//! name, and markers for branch points. The path never influences execution;
//! it exists so log lines and error messages can say *which* pipeline failed.

use std::fmt;

/// One segment of an [`ActionPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named registration: the root name, a named middleware stage, or an
    /// action name. Normalized to lowercase at insertion.
    Common(String),
    /// A branch point.
    Branch,
}

/// Ordered diagnostic trail of named registrations and branch points.
///
/// Appending a branch marker removes a trailing branch marker first, so
/// branching repeatedly without registering anything in between keeps a
/// single placeholder instead of accumulating them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPath {
    segments: Vec<PathSegment>,
}

impl ActionPath {
    /// Creates a path rooted at the given chain name.
    pub fn new(root: impl AsRef<str>) -> Self {
        let mut path = Self::default();
        path.push_common(root);
        path
    }

    /// Appends a named segment, normalized to lowercase.
    pub fn push_common(&mut self, name: impl AsRef<str>) {
        self.segments
            .push(PathSegment::Common(name.as_ref().to_lowercase()));
    }

    /// Appends a branch marker, collapsing a trailing one first.
    pub fn push_branch(&mut self) {
        if matches!(self.segments.last(), Some(PathSegment::Branch)) {
            self.segments.pop();
        }
        self.segments.push(PathSegment::Branch);
    }

    /// Number of recorded segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Read-only view of the segments.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Renders the path for log lines and error messages.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ActionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match segment {
                PathSegment::Common(name) => f.write_str(name)?,
                PathSegment::Branch => f.write_str("[branch]")?,
            }
        }
        Ok(())
    }
}
