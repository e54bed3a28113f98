//! # stoa-core
//!
//! Core traits for the Stoa handler context framework.
//!
//! This crate has minimal dependencies and is designed to be imported by hosts
//! and script engines that don't need the reference collaborators shipped in
//! `stoa-std`.
//!
//! # Three Moving Parts
//!
//! ## Attribute Stores ([`AttributeStore`])
//!
//! The host owns a set of scoped attribute stores (request, session,
//! application). Keys arrive in two native identities, symbolic and plain
//! ([`KeyIdentity`]), that both normalize to the same name.
//!
//! ## Context Facade ([`ContextFacade`])
//!
//! Presents an attribute store as a local map. The facade is seeded once at
//! construction and writes through to the store on every `set`. Operations the
//! facade does not model are forwarded verbatim with [`ContextFacade::invoke`].
//!
//! ## Capability Resolver ([`Controller`])
//!
//! Mixed into a handler type. Holds the injected facades and a shared
//! [`CapabilityRegistry`] reference, and resolves collaborators by key on
//! demand, either explicitly ([`Controller::find`]) or through the `find_<key>`
//! member convention ([`Controller::call_member`]).
//!
//! # Error Types
//!
//! - [`StoaError`] - Top-level error type
//! - [`StoreError`] - Forwarded store operation errors
//! - [`ResolveError`] - Collaborator lookup errors
//! - [`LoadError`] - Script loading errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod controller;
mod error;
mod facade;
mod key;
mod registry;
mod store;

// Re-exports
pub use controller::{Controller, ControllerState, ControllerStores, FINDER_PREFIX};
pub use error::{
    BoxError, LoadError, RegistryError, ResolveError, SourceLoadError, StoaError, StoreError,
};
pub use facade::{ContextFacade, SeedPolicy};
pub use key::{AttributeKey, KeyIdentity};
pub use registry::{CapabilityRegistry, Component, RegistryHandle, SharedRegistry, downcast};
pub use store::{AttributeStore, Operand, Outcome};
