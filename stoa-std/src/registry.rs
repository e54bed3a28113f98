//! Scoped component registry.
//!
//! Registries form a chain that mirrors the host's context scopes: a request
//! registry falls back to its session registry, which falls back to the
//! application registry. Components are either registered as instances or as
//! factories that run once, on first resolve.

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock},
};
use stoa_core::{CapabilityRegistry, Component, RegistryError, SharedRegistry};

/// The host scope a registry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextLevel {
    /// Lives as long as the application.
    Application,
    /// Lives as long as one client session.
    Session,
    /// Lives for one request.
    Request,
}

type Factory = Box<dyn Fn() -> Component + Send + Sync>;

enum Entry {
    Instance(Component),
    Lazy {
        factory: Factory,
        instance: OnceLock<Component>,
    },
}

impl Entry {
    fn component(&self) -> Component {
        match self {
            Entry::Instance(component) => component.clone(),
            Entry::Lazy { factory, instance } => instance.get_or_init(|| factory()).clone(),
        }
    }
}

/// A component registry for one [`ContextLevel`].
pub struct ComponentRegistry {
    level: ContextLevel,
    entries: HashMap<String, Entry>,
    parent: Option<SharedRegistry>,
}

impl ComponentRegistry {
    /// Start building a registry for `level`.
    pub fn builder(level: ContextLevel) -> RegistryBuilder {
        RegistryBuilder::new(level)
    }

    /// The scope of this registry.
    pub fn level(&self) -> ContextLevel {
        self.level
    }

    /// The registry consulted on a local miss.
    pub fn parent(&self) -> Option<&SharedRegistry> {
        self.parent.as_ref()
    }

    /// Returns `true` if `key` is registered here, ignoring parents.
    pub fn contains_local(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys registered here, ignoring parents.
    pub fn local_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of components registered here.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered here.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CapabilityRegistry for ComponentRegistry {
    fn resolve(&self, key: &str) -> Option<Component> {
        match self.entries.get(key) {
            Some(entry) => Some(entry.component()),
            None => self.parent.as_ref().and_then(|parent| parent.resolve(key)),
        }
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.local_keys().collect();
        keys.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("level", &self.level)
            .field("keys", &keys)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// Builder for [`ComponentRegistry`].
pub struct RegistryBuilder {
    level: ContextLevel,
    entries: HashMap<String, Entry>,
    parent: Option<SharedRegistry>,
    allow_overrides: bool,
}

impl RegistryBuilder {
    /// Create an empty builder for `level`.
    pub fn new(level: ContextLevel) -> Self {
        Self {
            level,
            entries: HashMap::new(),
            parent: None,
            allow_overrides: false,
        }
    }

    /// Fall back to `parent` for keys not registered here.
    pub fn parent(mut self, parent: SharedRegistry) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Allow re-registering a key (later registrations win).
    pub fn allow_overrides(mut self) -> Self {
        self.allow_overrides = true;
        self
    }

    fn insert_entry(&mut self, key: String, entry: Entry) -> Result<(), RegistryError> {
        if !self.allow_overrides && self.entries.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Register an already type-erased component.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        component: Component,
    ) -> Result<(), RegistryError> {
        self.insert_entry(key.into(), Entry::Instance(component))
    }

    /// Register `component` under `key`.
    pub fn register<T: Any + Send + Sync>(
        &mut self,
        key: impl Into<String>,
        component: T,
    ) -> Result<(), RegistryError> {
        self.insert(key, Arc::new(component))
    }

    /// Register a factory run once, on the first resolve of `key`.
    pub fn register_factory<T, F>(
        &mut self,
        key: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.insert_entry(
            key.into(),
            Entry::Lazy {
                factory: Box::new(move || Arc::new(factory()) as Component),
                instance: OnceLock::new(),
            },
        )
    }

    /// Add every statically submitted [`ComponentRegistration`] for this
    /// builder's level. Returns how many were added.
    #[cfg(feature = "inventory")]
    pub fn collect_registered(&mut self) -> Result<usize, RegistryError> {
        let mut added = 0;
        for registration in inventory::iter::<ComponentRegistration>() {
            if registration.level != self.level {
                continue;
            }
            let build = registration.build;
            self.insert_entry(
                registration.key.to_owned(),
                Entry::Lazy {
                    factory: Box::new(build),
                    instance: OnceLock::new(),
                },
            )?;
            added += 1;
        }
        Ok(added)
    }

    /// Build the registry.
    pub fn build(self) -> ComponentRegistry {
        ComponentRegistry {
            level: self.level,
            entries: self.entries,
            parent: self.parent,
        }
    }
}

/// A component submitted at compile time via `inventory::submit!`.
///
/// ```rust,ignore
/// inventory::submit! {
///     ComponentRegistration {
///         key: "mailer",
///         level: ContextLevel::Application,
///         build: || Arc::new(SmtpMailer::default()),
///     }
/// }
/// ```
#[cfg(feature = "inventory")]
pub struct ComponentRegistration {
    /// Registry key.
    pub key: &'static str,
    /// Scope the component is registered at.
    pub level: ContextLevel,
    /// Constructor, run once on first resolve.
    pub build: fn() -> Component,
}

#[cfg(feature = "inventory")]
inventory::collect!(ComponentRegistration);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stoa_core::downcast;

    #[test]
    fn test_resolves_registered_instance() {
        let mut builder = ComponentRegistry::builder(ContextLevel::Application);
        builder.register("mailer", "smtp").unwrap();
        let registry = builder.build();

        let mailer = registry.resolve("mailer").and_then(downcast::<&str>);
        assert_eq!(mailer.as_deref(), Some(&"smtp"));
        assert!(registry.resolve("logger").is_none());
    }

    #[test]
    fn test_duplicate_key_error() {
        let mut builder = ComponentRegistry::builder(ContextLevel::Request);
        builder.register("mailer", 1u8).unwrap();
        assert_eq!(
            builder.register("mailer", 2u8),
            Err(RegistryError::DuplicateKey("mailer".into()))
        );
    }

    #[test]
    fn test_allow_overrides() {
        let mut builder = ComponentRegistry::builder(ContextLevel::Request).allow_overrides();
        builder.register("limit", 1u8).unwrap();
        builder.register("limit", 2u8).unwrap();
        let registry = builder.build();
        assert_eq!(registry.resolve("limit").and_then(downcast::<u8>).as_deref(), Some(&2));
    }

    #[test]
    fn test_falls_back_to_parent_chain() {
        let mut app = ComponentRegistry::builder(ContextLevel::Application);
        app.register("mailer", "smtp").unwrap();
        app.register("clock", "system").unwrap();
        let app: SharedRegistry = Arc::new(app.build());

        let mut session = ComponentRegistry::builder(ContextLevel::Session).parent(app);
        session.register("cart", "empty").unwrap();
        session.register("clock", "frozen").unwrap();
        let session: SharedRegistry = Arc::new(session.build());

        let request = ComponentRegistry::builder(ContextLevel::Request)
            .parent(session)
            .build();

        let lookup = |key| request.resolve(key).and_then(downcast::<&str>).map(|s| *s);
        assert_eq!(lookup("mailer"), Some("smtp"));
        assert_eq!(lookup("cart"), Some("empty"));
        assert_eq!(lookup("clock"), Some("frozen"));
        assert_eq!(lookup("ghost"), None);
        assert!(request.is_empty());
    }

    #[test]
    fn test_factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut builder = ComponentRegistry::builder(ContextLevel::Session);
        builder
            .register_factory("connection", move || counter.fetch_add(1, Ordering::SeqCst))
            .unwrap();
        let registry = builder.build();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let first = registry.resolve("connection").unwrap();
        let second = registry.resolve("connection").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
