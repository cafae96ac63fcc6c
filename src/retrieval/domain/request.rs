//! Object path parsing and the retrieval request value object.

use super::RequestError;
use chrono::{DateTime, Utc};
use std::fmt;

/// A single object retrieval, addressed by namespace and object name.
///
/// Built from a caller path of the form `<namespace>/<name>`. Only the first
/// `/` separates the two parts, so `name` may itself contain slashes. A path
/// without any `/` yields the whole path as `namespace` and an empty `name`;
/// what an empty name resolves to is left to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetrievalRequest {
    namespace: String,
    name: String,
    as_of: Option<DateTime<Utc>>,
}

impl RetrievalRequest {
    /// Creates a request from already separated parts.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            as_of: None,
        }
    }

    /// Parses a caller path by splitting on its first `/`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::EmptyPath`] when `path` is empty.
    pub fn parse(path: &str) -> Result<Self, RequestError> {
        if path.is_empty() {
            return Err(RequestError::EmptyPath);
        }

        let (namespace, name) = path.split_once('/').unwrap_or((path, ""));
        Ok(Self::new(namespace, name))
    }

    /// Selects the newest object version created at or before `as_of`.
    #[must_use]
    pub const fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Returns the namespace (agent) component.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the object name component, possibly empty.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the version selector, `None` meaning the latest version.
    #[must_use]
    pub const fn as_of(&self) -> Option<DateTime<Utc>> {
        self.as_of
    }
}

impl fmt::Display for RetrievalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
