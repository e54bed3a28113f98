//! In-memory attribute store.
//!
//! A thread-safe stand-in for a host request, session, or application store.
//! Useful for embedding hosts that keep attributes in process, and for tests.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use stoa_core::{AttributeStore, KeyIdentity, Operand, Outcome, StoreError};

/// Names of the operations [`MemoryStore`] answers through `invoke`.
pub mod operations {
    /// Remove one attribute. Takes a key; yields the removed value.
    pub const REMOVE_ATTRIBUTE: &str = "remove_attribute";
    /// Test for presence. Takes a key; yields a flag.
    pub const CONTAINS_ATTRIBUTE: &str = "contains_attribute";
    /// Enumerate keys. Takes nothing; yields keys.
    pub const ATTRIBUTE_NAMES: &str = "attribute_names";
    /// Drop every attribute. Takes nothing.
    pub const INVALIDATE: &str = "invalidate";
}

struct Slot<V> {
    identity: KeyIdentity,
    value: V,
}

/// An attribute store backed by a lock-protected ordered map.
///
/// Each attribute remembers the identity it was last written with, so a host
/// write under a symbolic key followed by a facade write shows the downgrade
/// to a plain key.
pub struct MemoryStore<V = String> {
    attributes: RwLock<BTreeMap<String, Slot<V>>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            attributes: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<V: Clone> MemoryStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute while building the store.
    pub fn with_attribute(self, key: impl Into<KeyIdentity>, value: V) -> Self {
        self.set_attribute(&key.into(), value);
        self
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&self, key: &KeyIdentity) -> Option<V> {
        self.attributes.write().remove(key.name()).map(|slot| slot.value)
    }

    /// Returns `true` if an attribute with `key`'s name exists.
    pub fn contains_attribute(&self, key: &KeyIdentity) -> bool {
        self.attributes.read().contains_key(key.name())
    }

    /// The identity `name` was last written with.
    pub fn identity_of(&self, name: &str) -> Option<KeyIdentity> {
        self.attributes.read().get(name).map(|slot| slot.identity.clone())
    }

    /// Drop every attribute.
    pub fn invalidate(&self) {
        self.attributes.write().clear();
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.read().len()
    }

    /// Returns `true` if the store holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.read().is_empty()
    }
}

fn key_operand<'a, V>(
    operation: &str,
    args: &'a [Operand<V>],
    index: usize,
) -> Result<&'a KeyIdentity, StoreError> {
    args.get(index)
        .and_then(Operand::as_key)
        .ok_or_else(|| StoreError::InvalidOperand {
            operation: operation.to_owned(),
            index,
            expected: "a key",
        })
}

impl<V: Clone> AttributeStore for MemoryStore<V> {
    type Value = V;

    fn attribute_names(&self) -> Vec<KeyIdentity> {
        self.attributes
            .read()
            .values()
            .map(|slot| slot.identity.clone())
            .collect()
    }

    fn attribute(&self, key: &KeyIdentity) -> Option<V> {
        self.attributes
            .read()
            .get(key.name())
            .map(|slot| slot.value.clone())
    }

    fn set_attribute(&self, key: &KeyIdentity, value: V) {
        self.attributes.write().insert(
            key.name().to_owned(),
            Slot {
                identity: key.clone(),
                value,
            },
        );
    }

    fn invoke(&self, operation: &str, args: &[Operand<V>]) -> Result<Outcome<V>, StoreError> {
        match operation {
            operations::REMOVE_ATTRIBUTE => {
                let key = key_operand(operation, args, 0)?;
                Ok(Outcome::Value(self.remove_attribute(key)))
            }
            operations::CONTAINS_ATTRIBUTE => {
                let key = key_operand(operation, args, 0)?;
                Ok(Outcome::Flag(self.contains_attribute(key)))
            }
            operations::ATTRIBUTE_NAMES => Ok(Outcome::Keys(self.attribute_names())),
            operations::INVALIDATE => {
                self.invalidate();
                Ok(Outcome::Unit)
            }
            other => Err(StoreError::unsupported(other)),
        }
    }
}
