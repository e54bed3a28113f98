//! # Attribute Stores
//!
//! The host-owned side of a context. A store is shared with the host (and, for
//! sessions, with concurrent requests), so every method takes `&self` and the
//! implementation is responsible for its own synchronization.

use crate::{error::StoreError, key::KeyIdentity};
use std::sync::Arc;

/// An argument to a forwarded store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<V> {
    /// An attribute key.
    Key(KeyIdentity),
    /// An attribute value.
    Value(V),
}

impl<V> Operand<V> {
    /// Build a key operand.
    pub fn key(key: impl Into<KeyIdentity>) -> Self {
        Self::Key(key.into())
    }

    /// The key, if this operand is one.
    pub fn as_key(&self) -> Option<&KeyIdentity> {
        match self {
            Self::Key(key) => Some(key),
            Self::Value(_) => None,
        }
    }

    /// The value, if this operand is one.
    pub fn as_value(&self) -> Option<&V> {
        match self {
            Self::Value(value) => Some(value),
            Self::Key(_) => None,
        }
    }
}

/// The result of a forwarded store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    /// The operation produced nothing.
    Unit,
    /// The operation produced a (possibly absent) value.
    Value(Option<V>),
    /// The operation produced a set of keys.
    Keys(Vec<KeyIdentity>),
    /// The operation produced a flag.
    Flag(bool),
}

/// A host-managed attribute store scoped to a request, session, or application.
///
/// Keys with the same normalized name address the same attribute regardless of
/// their [`KeyIdentity`]. Implementations remember the identity a key was last
/// written with and report it from [`attribute_names`](Self::attribute_names).
///
/// # Forwarding
///
/// [`invoke`](Self::invoke) is the escape hatch for store-specific operations
/// (removal, invalidation, enumeration) that a
/// [`ContextFacade`](crate::ContextFacade) forwards without modelling. The
/// default rejects every operation with [`StoreError::UnsupportedOperation`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an attribute store",
    label = "missing `AttributeStore` implementation",
    note = "Stores must implement `attribute_names`, `attribute` and `set_attribute`."
)]
pub trait AttributeStore {
    /// The type of stored values.
    type Value: Clone;

    /// Enumerate every key currently present, with its native identity.
    fn attribute_names(&self) -> Vec<KeyIdentity>;

    /// Read the value stored under `key`'s normalized name.
    fn attribute(&self, key: &KeyIdentity) -> Option<Self::Value>;

    /// Store `value` under `key`.
    fn set_attribute(&self, key: &KeyIdentity, value: Self::Value);

    /// Invoke a named store-specific operation.
    fn invoke(
        &self,
        operation: &str,
        args: &[Operand<Self::Value>],
    ) -> Result<Outcome<Self::Value>, StoreError> {
        let _ = args;
        Err(StoreError::unsupported(operation))
    }
}

impl<S: AttributeStore + ?Sized> AttributeStore for &S {
    type Value = S::Value;

    fn attribute_names(&self) -> Vec<KeyIdentity> {
        (**self).attribute_names()
    }

    fn attribute(&self, key: &KeyIdentity) -> Option<Self::Value> {
        (**self).attribute(key)
    }

    fn set_attribute(&self, key: &KeyIdentity, value: Self::Value) {
        (**self).set_attribute(key, value)
    }

    fn invoke(
        &self,
        operation: &str,
        args: &[Operand<Self::Value>],
    ) -> Result<Outcome<Self::Value>, StoreError> {
        (**self).invoke(operation, args)
    }
}

impl<S: AttributeStore + ?Sized> AttributeStore for Arc<S> {
    type Value = S::Value;

    fn attribute_names(&self) -> Vec<KeyIdentity> {
        (**self).attribute_names()
    }

    fn attribute(&self, key: &KeyIdentity) -> Option<Self::Value> {
        (**self).attribute(key)
    }

    fn set_attribute(&self, key: &KeyIdentity, value: Self::Value) {
        (**self).set_attribute(key, value)
    }

    fn invoke(
        &self,
        operation: &str,
        args: &[Operand<Self::Value>],
    ) -> Result<Outcome<Self::Value>, StoreError> {
        (**self).invoke(operation, args)
    }
}
