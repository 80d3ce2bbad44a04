//! Fully-qualified names and `Collection(...)` type strings.

use serde::{Serialize, Serializer};
use std::fmt;

const COLLECTION_PREFIX: &str = "Collection(";

/// A `Namespace.Name` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullQualifiedName {
    pub namespace: String,
    pub name: String,
}

impl FullQualifiedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Split at the last dot: `a.b.Name` becomes (`a.b`, `Name`).
    pub fn parse(qualified: &str) -> Option<Self> {
        let (namespace, name) = qualified.rsplit_once('.')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(namespace, name))
    }
}

impl fmt::Display for FullQualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl Serialize for FullQualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Wrap a type name as `Collection(<name>)`.
pub fn collection_of(type_name: &str) -> String {
    format!("{}{})", COLLECTION_PREFIX, type_name)
}

/// Strip a `Collection(...)` wrapper, reporting whether one was present.
pub fn strip_collection(type_name: &str) -> (&str, bool) {
    match type_name
        .strip_prefix(COLLECTION_PREFIX)
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (inner, true),
        None => (type_name, false),
    }
}

/// Treat a blank explicit name as absent.
pub(crate) fn explicit(name: &Option<String>) -> Option<&str> {
    name.as_deref().map(str::trim).filter(|n| !n.is_empty())
}
