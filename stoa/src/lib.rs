//! # stoa - Handler Context Framework
//!
//! `stoa` lets dynamically loaded request handlers live inside a host web
//! environment. It provides three pieces:
//!
//! - **Context facades** present the host's request, session, and application
//!   attribute stores as local maps with write-through ([`ContextFacade`]).
//! - **Capability resolution** lets a handler fetch named collaborators from
//!   the host's component registry on demand ([`Controller`]).
//! - **Script loading** finds and loads handler scripts once at startup
//!   ([`ScriptLoader`]).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stoa::prelude::*;
//!
//! #[derive(Controller, Default)]
//! struct CartController {
//!     state: ControllerState<Arc<MemoryStore>>,
//! }
//!
//! // Startup
//! let mut loader = ScriptLoader::new(LoaderConfig::default().extension("rhai"));
//! loader.load_all("dir:WEB-INF/scripts/", &DirectoryHost::new(root), &mut engine)?;
//!
//! // Per request
//! let mut handler = CartController::default();
//! handler.set_registry(registry.clone());
//! Activation::new()
//!     .request(request_store)
//!     .session(session_store)
//!     .apply(&mut handler);
//!
//! let mailer = handler.find_as::<Mailer>("mailer")?;
//! handler.session_mut().unwrap().set("last_item", "sku-42".to_string());
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod activation;

pub use activation::Activation;

pub use stoa_core::{
    // Keys
    AttributeKey,
    // Stores
    AttributeStore,
    // Errors
    BoxError,
    // Registry
    CapabilityRegistry,
    Component,
    // Facade
    ContextFacade,
    // Controller
    Controller,
    ControllerState,
    ControllerStores,
    FINDER_PREFIX,
    KeyIdentity,
    LoadError,
    Operand,
    Outcome,
    RegistryError,
    RegistryHandle,
    ResolveError,
    SeedPolicy,
    SharedRegistry,
    SourceLoadError,
    StoaError,
    StoreError,
    downcast,
};

// Reference collaborators
pub use stoa_std::{
    loader::{
        BundledHost, BundledScript, DirectoryHost, HostEnvironment, LoaderConfig, ScriptEngine,
        ScriptLoader, ScriptLocation, SourceUnit, UnitOrigin,
    },
    logging::{LoggingRegistry, LoggingStore},
    memory::MemoryStore,
    registry::{ComponentRegistry, ContextLevel, RegistryBuilder},
};

#[cfg(feature = "inventory")]
pub use stoa_std::registry::ComponentRegistration;

// Full module access
pub use stoa_std::{loader, logging, memory, registry, testing};

#[cfg(feature = "macros")]
pub use stoa_macros::Controller;

#[cfg(feature = "inventory")]
pub use inventory;

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        Activation, AttributeStore, CapabilityRegistry, Component, ComponentRegistry,
        ContextFacade, ContextLevel, Controller, ControllerState, DirectoryHost, KeyIdentity,
        LoaderConfig, MemoryStore, ResolveError, ScriptLoader, SeedPolicy, SharedRegistry,
    };
    pub use std::sync::Arc;
}
