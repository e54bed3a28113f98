//! Testing utilities for Stoa.
//!
//! This module provides doubles for the host-side collaborators so that
//! handlers and facades can be exercised without a real host.
//!
//! # Features
//!
//! - [`RecordingStore`]: A memory store that records every call it receives
//! - [`CountingRegistry`]: A registry wrapper that counts hits and misses
//! - [`RecordingEngine`]: A script engine that records loaded units and can be told to fail

use crate::{loader::ScriptEngine, loader::SourceUnit, memory::MemoryStore};
use parking_lot::Mutex;
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use stoa_core::{
    AttributeStore, BoxError, CapabilityRegistry, Component, KeyIdentity, Operand, Outcome,
    StoreError,
};

// ============================================================================
// Recording Store
// ============================================================================

/// A call observed by a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `attribute_names`
    Names,
    /// `attribute(key)`
    Get(KeyIdentity),
    /// `set_attribute(key, _)`
    Set(KeyIdentity),
    /// `invoke(operation, _)`
    Invoke(String),
}

/// A memory store that records every call.
///
/// # Example
///
/// ```rust,ignore
/// let store = RecordingStore::new(MemoryStore::new());
/// let mut facade = ContextFacade::new(&store);
/// facade.set("user", "bob".into());
///
/// assert_eq!(store.calls().last(), Some(&StoreCall::Set(KeyIdentity::plain("user"))));
/// ```
pub struct RecordingStore<V = String> {
    inner: MemoryStore<V>,
    calls: Mutex<Vec<StoreCall>>,
}

impl<V: Clone> RecordingStore<V> {
    /// Record calls made against `inner`.
    pub fn new(inner: MemoryStore<V>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &MemoryStore<V> {
        &self.inner
    }

    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }
}

impl<V: Clone> AttributeStore for RecordingStore<V> {
    type Value = V;

    fn attribute_names(&self) -> Vec<KeyIdentity> {
        self.record(StoreCall::Names);
        self.inner.attribute_names()
    }

    fn attribute(&self, key: &KeyIdentity) -> Option<V> {
        self.record(StoreCall::Get(key.clone()));
        self.inner.attribute(key)
    }

    fn set_attribute(&self, key: &KeyIdentity, value: V) {
        self.record(StoreCall::Set(key.clone()));
        self.inner.set_attribute(key, value);
    }

    fn invoke(&self, operation: &str, args: &[Operand<V>]) -> Result<Outcome<V>, StoreError> {
        self.record(StoreCall::Invoke(operation.to_owned()));
        self.inner.invoke(operation, args)
    }
}

// ============================================================================
// Counting Registry
// ============================================================================

/// A registry wrapper that counts lookups.
///
/// Clones share their counters.
pub struct CountingRegistry<R> {
    inner: Arc<R>,
    hits: Arc<AtomicUsize>,
    misses: Arc<AtomicUsize>,
}

impl<R> CountingRegistry<R> {
    /// Count lookups made against `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner: Arc::new(inner),
            hits: Arc::new(AtomicUsize::new(0)),
            misses: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Lookups that found a component.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Lookups that found nothing.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::SeqCst)
    }

    /// Reset both counters.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::SeqCst);
        self.misses.store(0, Ordering::SeqCst);
    }
}

impl<R> Clone for CountingRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
        }
    }
}

impl<R: CapabilityRegistry> CapabilityRegistry for CountingRegistry<R> {
    fn resolve(&self, key: &str) -> Option<Component> {
        let component = self.inner.resolve(key);
        let counter = if component.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::SeqCst);
        component
    }
}

// ============================================================================
// Recording Engine
// ============================================================================

/// A script engine that records the units it loads.
///
/// Clones share their records.
#[derive(Clone, Default)]
pub struct RecordingEngine {
    units: Arc<Mutex<Vec<SourceUnit>>>,
    failing: Arc<HashSet<String>>,
}

impl RecordingEngine {
    /// Create an engine that accepts every unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the unit named `name`.
    pub fn fail_on(self, name: impl Into<String>) -> Self {
        let mut failing = (*self.failing).clone();
        failing.insert(name.into());
        Self {
            units: self.units,
            failing: Arc::new(failing),
        }
    }

    /// Get a clone of the loaded units, in load order.
    pub fn units(&self) -> Vec<SourceUnit> {
        self.units.lock().clone()
    }

    /// Names of the loaded units, in load order.
    pub fn names(&self) -> Vec<String> {
        self.units.lock().iter().map(|unit| unit.name.clone()).collect()
    }
}

impl ScriptEngine for RecordingEngine {
    fn load(&mut self, unit: &SourceUnit) -> Result<(), BoxError> {
        if self.failing.contains(&unit.name) {
            return Err(format!("rejected {}", unit.name).into());
        }
        self.units.lock().push(unit.clone());
        Ok(())
    }
}
