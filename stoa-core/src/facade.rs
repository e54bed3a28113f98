//! # Context Facade
//!
//! Presents a host [`AttributeStore`] as a local map with write-through.
//!
//! The facade keeps a cache keyed by normalized name. It is seeded once, at
//! construction, from the store's current keys; afterwards reads are served
//! from the cache only and every write goes to the store first and the cache
//! second. Consistency for keys added to the store after construction therefore
//! relies on them being written through the facade (or pulled in explicitly
//! with [`ContextFacade::refresh`]).
//!
//! ```rust,ignore
//! let facade = ContextFacade::new(&session);
//! assert_eq!(facade.get("user"), Some(&"alice".to_string()));
//! ```

use crate::{
    error::StoreError,
    key::{AttributeKey, KeyIdentity},
    store::{AttributeStore, Operand, Outcome},
};
use bitflags::bitflags;
use std::{collections::HashMap, fmt};

bitflags! {
    /// Which native key identities are imported when a facade is seeded.
    ///
    /// The default imports symbolic keys only. Plain keys already present in
    /// the store are skipped and stay invisible to [`ContextFacade::get`] until
    /// they are set or refreshed through the facade.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SeedPolicy: u8 {
        /// Import keys whose native identity is symbolic.
        const SYMBOLIC = 1;
        /// Import keys whose native identity is plain.
        const PLAIN = 1 << 1;
    }
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self::SYMBOLIC
    }
}

impl SeedPolicy {
    /// Returns `true` if `key` is imported under this policy.
    pub fn admits(&self, key: &KeyIdentity) -> bool {
        if key.is_symbolic() {
            self.contains(Self::SYMBOLIC)
        } else {
            self.contains(Self::PLAIN)
        }
    }
}

/// A map view over a host attribute store.
///
/// `S` is usually a borrow (`&MemoryStore`) or a shared pointer
/// (`Arc<MemoryStore>`); the facade never owns the host's data.
pub struct ContextFacade<S: AttributeStore> {
    store: S,
    entries: HashMap<String, S::Value>,
}

impl<S: AttributeStore> ContextFacade<S> {
    /// Wrap `store`, importing its symbolic keys.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, SeedPolicy::default())
    }

    /// Wrap `store`, importing the keys admitted by `policy`.
    pub fn with_policy(store: S, policy: SeedPolicy) -> Self {
        let mut entries = HashMap::new();
        for key in store.attribute_names() {
            if !policy.admits(&key) {
                continue;
            }
            if let Some(value) = store.attribute(&key) {
                entries.insert(key.into_name(), value);
            }
        }
        Self { store, entries }
    }

    /// Read the cached value for `key`. Never consults the store.
    pub fn get<K: AttributeKey + ?Sized>(&self, key: &K) -> Option<&S::Value> {
        self.entries.get(key.normalized())
    }

    /// Write `value` to the store under the plain form of `key`, then cache it.
    ///
    /// Returns the previously cached value.
    pub fn set(&mut self, key: impl Into<KeyIdentity>, value: S::Value) -> Option<S::Value> {
        let name = key.into().into_name();
        self.store
            .set_attribute(&KeyIdentity::Plain(name.clone()), value.clone());
        self.entries.insert(name, value)
    }

    /// Re-read one attribute from the store into the cache.
    ///
    /// A key missing from the store is dropped from the cache as well.
    pub fn refresh<K: AttributeKey + ?Sized>(&mut self, key: &K) -> Option<&S::Value> {
        let name = key.normalized();
        match self.store.attribute(&KeyIdentity::plain(name)) {
            Some(value) => {
                self.entries.insert(name.to_owned(), value);
                self.entries.get(name)
            }
            None => {
                self.entries.remove(name);
                None
            }
        }
    }

    /// Forward a named operation to the store, returning its result unchanged.
    pub fn invoke(
        &self,
        operation: &str,
        args: &[Operand<S::Value>],
    ) -> Result<Outcome<S::Value>, StoreError> {
        self.store.invoke(operation, args)
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns `true` if `key` is cached.
    pub fn contains_key<K: AttributeKey + ?Sized>(&self, key: &K) -> bool {
        self.entries.contains_key(key.normalized())
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over cached names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over cached entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &S::Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop the cache and hand back the store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> fmt::Debug for ContextFacade<S>
where
    S: AttributeStore,
    S::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    /// Minimal single-threaded store that keeps the identity of each write.
    #[derive(Default)]
    struct CellStore {
        attrs: RefCell<BTreeMap<String, (KeyIdentity, String)>>,
    }

    impl CellStore {
        fn with(entries: &[(KeyIdentity, &str)]) -> Self {
            let store = Self::default();
            for (key, value) in entries {
                store.set_attribute(key, value.to_string());
            }
            store
        }

        fn identity_of(&self, name: &str) -> Option<KeyIdentity> {
            self.attrs.borrow().get(name).map(|(k, _)| k.clone())
        }
    }

    impl AttributeStore for CellStore {
        type Value = String;

        fn attribute_names(&self) -> Vec<KeyIdentity> {
            self.attrs.borrow().values().map(|(k, _)| k.clone()).collect()
        }

        fn attribute(&self, key: &KeyIdentity) -> Option<String> {
            self.attrs.borrow().get(key.name()).map(|(_, v)| v.clone())
        }

        fn set_attribute(&self, key: &KeyIdentity, value: String) {
            self.attrs
                .borrow_mut()
                .insert(key.name().to_owned(), (key.clone(), value));
        }
    }

    #[test]
    fn test_seeds_symbolic_keys_only() {
        let store = CellStore::with(&[
            (KeyIdentity::symbol("user"), "alice"),
            (KeyIdentity::plain("locale"), "en"),
        ]);
        let facade = ContextFacade::new(&store);

        assert_eq!(facade.get("user"), Some(&"alice".to_string()));
        assert_eq!(facade.get(&KeyIdentity::symbol("user")), Some(&"alice".to_string()));
        assert!(!facade.contains_key("locale"));
        assert_eq!(facade.len(), 1);
    }

    #[test]
    fn test_policy_can_import_plain_keys() {
        let store = CellStore::with(&[
            (KeyIdentity::symbol("user"), "alice"),
            (KeyIdentity::plain("locale"), "en"),
        ]);
        let facade = ContextFacade::with_policy(&store, SeedPolicy::all());
        assert_eq!(facade.get("locale"), Some(&"en".to_string()));

        let facade = ContextFacade::with_policy(&store, SeedPolicy::PLAIN);
        assert!(!facade.contains_key("user"));
        assert!(facade.contains_key("locale"));
    }

    #[test]
    fn test_set_writes_through_with_plain_identity() {
        let store = CellStore::with(&[(KeyIdentity::symbol("user"), "alice")]);
        let mut facade = ContextFacade::new(&store);

        let previous = facade.set(KeyIdentity::symbol("user"), "bob".to_string());
        assert_eq!(previous.as_deref(), Some("alice"));
        assert_eq!(facade.get("user"), Some(&"bob".to_string()));
        assert_eq!(
            store.attribute(&KeyIdentity::plain("user")).as_deref(),
            Some("bob")
        );
        assert_eq!(store.identity_of("user"), Some(KeyIdentity::plain("user")));
    }

    #[test]
    fn test_get_does_not_read_through() {
        let store = CellStore::default();
        let mut facade = ContextFacade::new(&store);
        store.set_attribute(&KeyIdentity::symbol("late"), "x".into());

        assert!(facade.get("late").is_none());
        assert_eq!(facade.refresh("late"), Some(&"x".to_string()));
        assert_eq!(facade.get("late"), Some(&"x".to_string()));
    }

    #[test]
    fn test_refresh_drops_missing_keys() {
        let store = CellStore::with(&[(KeyIdentity::symbol("gone"), "1")]);
        let mut facade = ContextFacade::new(&store);
        store.attrs.borrow_mut().clear();

        assert!(facade.refresh("gone").is_none());
        assert!(facade.is_empty());
    }

    #[test]
    fn test_unsupported_operations_propagate() {
        let store = CellStore::default();
        let facade = ContextFacade::new(&store);
        let err = facade.invoke("invalidate", &[]).unwrap_err();
        assert_eq!(err, StoreError::unsupported("invalidate"));
    }
}
