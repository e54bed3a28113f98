//! Error types for Stoa.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`StoaError`] - Top-level error type for all Stoa operations
//! - [`StoreError`] - Errors from forwarded attribute store operations
//! - [`ResolveError`] - Errors from collaborator lookups
//! - [`LoadError`] - Errors while loading handler scripts
//! - [`RegistryError`] - Errors while building a component registry

use std::path::PathBuf;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Stoa operations.
#[derive(Error, Debug)]
pub enum StoaError {
    /// A forwarded store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A collaborator could not be resolved.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// A handler script failed to load.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// A registry could not be built.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors surfaced by an attribute store for forwarded operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store does not support the named operation.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation {
        /// The operation name, as forwarded.
        operation: String,
    },

    /// An argument had the wrong shape for the operation.
    #[error("operation `{operation}` expected {expected} at argument {index}")]
    InvalidOperand {
        /// The operation name.
        operation: String,
        /// Position of the offending argument.
        index: usize,
        /// What the operation expected there.
        expected: &'static str,
    },
}

impl StoreError {
    /// Shorthand for [`StoreError::UnsupportedOperation`].
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }
}

/// Errors raised while resolving a collaborator through a handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The member is undeclared, or matched the finder convention but the
    /// registry had nothing under the derived key.
    #[error("unresolved member `{name}` with {} argument(s)", args.len())]
    Unresolved {
        /// The member name as it was invoked.
        name: String,
        /// Debug renderings of the arguments it was invoked with.
        args: Vec<String>,
    },

    /// A lookup was attempted before any registry was installed.
    #[error("no registry installed while resolving `{name}`")]
    RegistryNotInstalled {
        /// The member name as it was invoked.
        name: String,
    },

    /// The component exists but is not of the requested type.
    #[error("component `{key}` is not a `{expected}`")]
    TypeMismatch {
        /// The registry key.
        key: String,
        /// The requested type name.
        expected: &'static str,
    },
}

impl ResolveError {
    /// The member name the failed lookup was made under, if any.
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::Unresolved { name, .. } | Self::RegistryNotInstalled { name } => Some(name),
            Self::TypeMismatch { .. } => None,
        }
    }
}

/// Errors raised while loading handler scripts. Loading is fail-fast: the first
/// error aborts the remaining units.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The location descriptor could not be interpreted.
    #[error("invalid script location: {0:?}")]
    InvalidLocation(String),

    /// The host could not map a path onto the filesystem.
    #[error("host has no real path for {0:?}")]
    MissingRoot(String),

    /// Reading a source unit failed.
    #[error("failed to read {}", path.display())]
    Io {
        /// Path of the unit being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A resource prefix or packaged resource the host does not know.
    #[error("packaged resource not found: {0}")]
    MissingResource(String),

    /// The script engine rejected a unit.
    #[error("failed to load source unit `{unit}`")]
    Engine {
        /// Name of the rejected unit.
        unit: String,
        /// Error reported by the engine.
        #[source]
        source: BoxError,
    },
}

/// Alias used at the host bootstrap boundary.
pub type SourceLoadError = LoadError;

/// Errors that can occur while building a component registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A component is already registered under this key.
    #[error("component already registered for key: {0}")]
    DuplicateKey(String),
}

// Convenience conversions
impl From<BoxError> for StoaError {
    fn from(err: BoxError) -> Self {
        StoaError::Custom(err)
    }
}
