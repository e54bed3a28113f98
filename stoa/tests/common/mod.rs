#![allow(dead_code)]

use stoa::{
    ComponentRegistry, ContextLevel, Controller, ControllerState, KeyIdentity, MemoryStore,
    SharedRegistry,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Collaborators
// ============================================================================

#[derive(Debug)]
pub struct Mailer {
    pub host: String,
    pub sent: AtomicUsize,
}

impl Mailer {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            sent: AtomicUsize::new(0),
        }
    }

    pub fn send(&self, _to: &str) {
        self.sent.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, PartialEq)]
pub struct AuditLog {
    pub target: &'static str,
}

// ============================================================================
// Stores
// ============================================================================

pub type SharedStore = Arc<MemoryStore>;

/// A session the host populated before the handler ran: `user` under a
/// symbolic key, `locale` under a plain one.
pub fn populated_session() -> SharedStore {
    Arc::new(
        MemoryStore::new()
            .with_attribute(KeyIdentity::symbol("user"), "alice".to_string())
            .with_attribute("locale", "en".to_string()),
    )
}

// ============================================================================
// Registries
// ============================================================================

pub fn application_registry() -> ComponentRegistry {
    let mut builder = ComponentRegistry::builder(ContextLevel::Application);
    builder
        .register("mailer", Mailer::new("smtp.example.org"))
        .unwrap();
    builder.build()
}

/// A request-level registry layered over [`application_registry`].
pub fn request_registry() -> SharedRegistry {
    let parent: SharedRegistry = Arc::new(application_registry());
    let mut builder = ComponentRegistry::builder(ContextLevel::Request).parent(parent);
    builder
        .register("audit", AuditLog { target: "orders" })
        .unwrap();
    Arc::new(builder.build())
}

// ============================================================================
// Handlers
// ============================================================================

/// A handler with a hand-written `Controller` impl.
#[derive(Default)]
pub struct OrdersController {
    pub state: ControllerState<SharedStore>,
}

impl Controller for OrdersController {
    type RequestStore = SharedStore;
    type SessionStore = SharedStore;
    type ApplicationStore = SharedStore;

    fn controller_state(&self) -> &ControllerState<SharedStore> {
        &self.state
    }

    fn controller_state_mut(&mut self) -> &mut ControllerState<SharedStore> {
        &mut self.state
    }
}

impl OrdersController {
    /// Another instance of the same handler type, sharing the registry slot.
    pub fn sibling(&self) -> Self {
        Self {
            state: self.state.fork(),
        }
    }
}
