//! Expanded names.
//!
//! Template names, modes, attribute-set names, and every other named
//! declaration are compared by expanded name: an optional namespace URI plus
//! a local part. Prefixes are resolved before a name reaches this layer.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An expanded name (`{namespace-uri}local-part`).
///
/// Cloning is cheap: both parts are reference counted.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QName {
    /// Namespace URI, `None` for names in no namespace.
    namespace: Option<Arc<str>>,
    /// Local part.
    local: Arc<str>,
}

impl QName {
    /// Creates a name in no namespace.
    #[must_use]
    pub fn local(local: &str) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Creates a name in the given namespace.
    ///
    /// An empty namespace URI is the same as no namespace.
    #[must_use]
    pub fn new(namespace: &str, local: &str) -> Self {
        Self {
            namespace: (!namespace.is_empty()).then(|| namespace.into()),
            local: local.into(),
        }
    }

    /// Parses Clark notation (`{uri}local`), EQName notation (`Q{uri}local`),
    /// or a bare local name.
    ///
    /// Returns `None` if the braces are unbalanced or the local part is empty.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('Q').filter(|r| r.starts_with('{')).unwrap_or(s);

        if let Some(rest) = s.strip_prefix('{') {
            let (uri, local) = rest.split_once('}')?;
            if local.is_empty() || local.contains(['{', '}']) {
                return None;
            }
            return Some(Self::new(uri, local));
        }

        if s.is_empty() || s.contains(['{', '}']) {
            None
        } else {
            Some(Self::local(s))
        }
    }

    /// Returns the namespace URI, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the local part.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Returns true if this name has the given namespace and local part.
    #[must_use]
    pub fn matches(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace() == namespace && self.local_name() == local
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QName({self})")
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}
