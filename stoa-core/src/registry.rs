//! # Capability Registry
//!
//! The lookup contract consumed from the host's dependency container, and the
//! shared slot handlers use to reach it.

use parking_lot::RwLock;
use std::{any::Any, fmt, sync::Arc};

/// A type-erased collaborator instance.
pub type Component = Arc<dyn Any + Send + Sync>;

/// A registry shared between handler instances.
pub type SharedRegistry = Arc<dyn CapabilityRegistry>;

/// A component registry queried by string key.
///
/// Only the lookup side of the host container is modelled here; how components
/// get registered and wired is the container's business.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot resolve components",
    label = "missing `CapabilityRegistry` implementation",
    note = "Implement `resolve`, or pass a closure `Fn(&str) -> Option<Component>`."
)]
pub trait CapabilityRegistry: Send + Sync {
    /// Look up the component registered under `key`.
    fn resolve(&self, key: &str) -> Option<Component>;
}

// Blanket impl for closures
impl<F> CapabilityRegistry for F
where
    F: Fn(&str) -> Option<Component> + Send + Sync,
{
    fn resolve(&self, key: &str) -> Option<Component> {
        (self)(key)
    }
}

/// Recover a concrete component type.
pub fn downcast<T: Any + Send + Sync>(component: Component) -> Option<Arc<T>> {
    component.downcast::<T>().ok()
}

/// A shared, replaceable slot holding the installed registry.
///
/// Cloning the handle shares the slot: installing a registry through any clone
/// replaces it for every holder. Hosts give all instances of one handler type
/// the same handle and install once during initialization, before requests run.
#[derive(Clone, Default)]
pub struct RegistryHandle(Arc<RwLock<Option<SharedRegistry>>>);

impl RegistryHandle {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot with `registry` already installed.
    pub fn with_registry(registry: SharedRegistry) -> Self {
        Self(Arc::new(RwLock::new(Some(registry))))
    }

    /// Install `registry`, returning the one it replaced.
    pub fn install(&self, registry: SharedRegistry) -> Option<SharedRegistry> {
        self.0.write().replace(registry)
    }

    /// Remove the installed registry.
    pub fn clear(&self) -> Option<SharedRegistry> {
        self.0.write().take()
    }

    /// The currently installed registry.
    pub fn current(&self) -> Option<SharedRegistry> {
        self.0.read().clone()
    }

    /// Returns `true` if a registry is installed.
    pub fn is_installed(&self) -> bool {
        self.0.read().is_some()
    }

    /// Returns `true` if both handles share one slot.
    pub fn shares_slot_with(&self, other: &RegistryHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryHandle")
            .field("installed", &self.is_installed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(key: &'static str, value: &'static str) -> SharedRegistry {
        Arc::new(move |k: &str| (k == key).then(|| Arc::new(value) as Component))
    }

    #[test]
    fn test_closure_registry() {
        let registry = single("mailer", "smtp");
        let found = registry.resolve("mailer").and_then(downcast::<&str>);
        assert_eq!(found.as_deref(), Some(&"smtp"));
        assert!(registry.resolve("logger").is_none());
    }

    #[test]
    fn test_install_is_visible_through_clones() {
        let handle = RegistryHandle::new();
        let shared = handle.clone();
        assert!(!shared.is_installed());

        assert!(handle.install(single("a", "1")).is_none());
        assert!(shared.is_installed());
        assert!(shared.shares_slot_with(&handle));

        let previous = shared.install(single("b", "2"));
        assert!(previous.is_some());
        let current = handle.current().expect("registry installed");
        assert!(current.resolve("a").is_none());
        assert!(current.resolve("b").is_some());
    }

    #[test]
    fn test_separate_handles_do_not_share() {
        let a = RegistryHandle::with_registry(single("a", "1"));
        let b = RegistryHandle::new();
        assert!(!a.shares_slot_with(&b));
        assert!(!b.is_installed());
        assert!(a.clear().is_some());
        assert!(!a.is_installed());
    }
}
