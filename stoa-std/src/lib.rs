//! # stoa-std
//!
//! Standard implementations for the Stoa handler context framework.
//!
//! This crate provides:
//! - **Attribute stores**: [`MemoryStore`](memory::MemoryStore), a thread-safe in-memory host store
//! - **Registries**: [`ComponentRegistry`](registry::ComponentRegistry), scoped with parent fallback
//! - **Script loading**: [`ScriptLoader`](loader::ScriptLoader) over directory and bundled hosts
//! - **Logging decorators**: [`LoggingStore`](logging::LoggingStore), [`LoggingRegistry`](logging::LoggingRegistry)
//! - **Testing utilities**: recording stores, counting registries, recording engines

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

#[macro_use]
mod log;

// Re-export core traits
pub use stoa_core;

// Modules
pub mod loader;
pub mod logging;
pub mod memory;
pub mod registry;
pub mod testing;

#[cfg(feature = "inventory")]
pub use inventory;
