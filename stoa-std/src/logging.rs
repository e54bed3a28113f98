//! Logging decorators for stores and registries.
//!
//! Both wrappers forward every call unchanged. With the `tracing` feature they
//! also emit events: store traffic at `trace` level, registry lookups at
//! `debug` level.

use stoa_core::{
    AttributeStore, CapabilityRegistry, Component, KeyIdentity, Operand, Outcome, StoreError,
};

/// An attribute store that logs each access.
pub struct LoggingStore<S> {
    inner: S,
    scope: &'static str,
}

impl<S> LoggingStore<S> {
    /// Wrap `inner`, tagging events with `scope` (e.g. `"session"`).
    pub const fn new(inner: S, scope: &'static str) -> Self {
        Self { inner, scope }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The scope tag.
    pub fn scope(&self) -> &'static str {
        self.scope
    }
}

impl<S: AttributeStore> AttributeStore for LoggingStore<S> {
    type Value = S::Value;

    fn attribute_names(&self) -> Vec<KeyIdentity> {
        let names = self.inner.attribute_names();
        trace!(scope = self.scope, count = names.len(), "attribute names enumerated");
        names
    }

    fn attribute(&self, key: &KeyIdentity) -> Option<Self::Value> {
        let value = self.inner.attribute(key);
        trace!(scope = self.scope, %key, hit = value.is_some(), "attribute read");
        value
    }

    fn set_attribute(&self, key: &KeyIdentity, value: Self::Value) {
        trace!(scope = self.scope, %key, "attribute written");
        self.inner.set_attribute(key, value);
    }

    fn invoke(
        &self,
        operation: &str,
        args: &[Operand<Self::Value>],
    ) -> Result<Outcome<Self::Value>, StoreError> {
        let result = self.inner.invoke(operation, args);
        trace!(
            scope = self.scope,
            operation,
            args = args.len(),
            ok = result.is_ok(),
            "store operation forwarded"
        );
        result
    }
}

/// A registry that logs each lookup.
pub struct LoggingRegistry<R> {
    inner: R,
    name: &'static str,
}

impl<R> LoggingRegistry<R> {
    /// Wrap `inner`, tagging events with `name`.
    pub const fn new(inner: R, name: &'static str) -> Self {
        Self { inner, name }
    }

    /// The wrapped registry.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// The name tag.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<R: CapabilityRegistry> CapabilityRegistry for LoggingRegistry<R> {
    fn resolve(&self, key: &str) -> Option<Component> {
        let component = self.inner.resolve(key);
        match component {
            Some(_) => {
                debug!(registry = self.name, key, "component resolved");
            }
            None => {
                debug!(registry = self.name, key, "component not registered");
            }
        }
        component
    }
}
