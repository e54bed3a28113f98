//! # Key Identities
//!
//! Host attribute stores hand out keys in one of two native identities: a
//! symbolic name used by handler code, or a plain string used by the host API.
//! Both normalize to the same name and address the same attribute.

use std::fmt;

/// The native identity of an attribute key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyIdentity {
    /// A symbolic name, as produced by handler code.
    Symbolic(String),
    /// A plain string name, as produced by the host API.
    Plain(String),
}

impl KeyIdentity {
    /// Create a symbolic key.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbolic(name.into())
    }

    /// Create a plain key.
    pub fn plain(name: impl Into<String>) -> Self {
        Self::Plain(name.into())
    }

    /// The normalized name of this key.
    pub fn name(&self) -> &str {
        match self {
            Self::Symbolic(name) | Self::Plain(name) => name,
        }
    }

    /// Consume the key, returning its normalized name.
    pub fn into_name(self) -> String {
        match self {
            Self::Symbolic(name) | Self::Plain(name) => name,
        }
    }

    /// Returns `true` if the native identity is symbolic.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }

    /// The plain-identity form of this key.
    pub fn to_plain(&self) -> Self {
        Self::Plain(self.name().to_owned())
    }

    /// Returns `true` if both keys normalize to the same name.
    pub fn same_name(&self, other: &KeyIdentity) -> bool {
        self.name() == other.name()
    }
}

impl fmt::Display for KeyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbolic(name) => write!(f, ":{name}"),
            Self::Plain(name) => f.write_str(name),
        }
    }
}

impl From<&str> for KeyIdentity {
    fn from(name: &str) -> Self {
        Self::Plain(name.to_owned())
    }
}

impl From<String> for KeyIdentity {
    fn from(name: String) -> Self {
        Self::Plain(name)
    }
}

impl From<&KeyIdentity> for KeyIdentity {
    fn from(key: &KeyIdentity) -> Self {
        key.clone()
    }
}

/// Anything that can present a normalized attribute name without allocating.
///
/// Read paths accept `&K where K: AttributeKey` so that both `facade.get("user")`
/// and `facade.get(&KeyIdentity::symbol("user"))` work.
pub trait AttributeKey {
    /// The normalized name.
    fn normalized(&self) -> &str;
}

impl AttributeKey for str {
    fn normalized(&self) -> &str {
        self
    }
}

impl AttributeKey for String {
    fn normalized(&self) -> &str {
        self
    }
}

impl AttributeKey for KeyIdentity {
    fn normalized(&self) -> &str {
        self.name()
    }
}
