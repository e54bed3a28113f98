//! Host environments the loader resolves locations against.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    fs, io,
    path::PathBuf,
};

/// The slice of the host environment the script loader needs.
pub trait HostEnvironment {
    /// Map a host path onto the filesystem, if the host is file-backed.
    fn real_path(&self, path: &str) -> Option<PathBuf>;

    /// List the packaged resources directly under `prefix`.
    ///
    /// Entries are full paths; subdirectories end with `/`. A prefix the host
    /// does not know fails with [`io::ErrorKind::NotFound`].
    fn resource_paths(&self, prefix: &str) -> io::Result<Vec<String>>;

    /// Read a packaged resource. Missing resources fail with
    /// [`io::ErrorKind::NotFound`].
    fn resource(&self, path: &str) -> io::Result<String>;
}

fn directory_prefix(prefix: &str) -> Cow<'_, str> {
    if prefix.is_empty() || prefix.ends_with('/') {
        Cow::Borrowed(prefix)
    } else {
        Cow::Owned(format!("{prefix}/"))
    }
}

/// A host rooted at a filesystem directory.
///
/// Resource paths are resolved against the root too, so an exploded
/// deployment serves both location kinds.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    root: PathBuf,
}

impl DirectoryHost {
    /// Create a host rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl HostEnvironment for DirectoryHost {
    fn real_path(&self, path: &str) -> Option<PathBuf> {
        Some(self.resolve(path))
    }

    fn resource_paths(&self, prefix: &str) -> io::Result<Vec<String>> {
        let base = directory_prefix(prefix);
        let mut paths = Vec::new();
        for entry in fs::read_dir(self.resolve(&base))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() {
                paths.push(format!("{base}{name}/"));
            } else {
                paths.push(format!("{base}{name}"));
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn resource(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }
}

/// A host whose resources are bundled into the binary.
///
/// With the `inventory` feature, [`BundledHost::collected`] gathers every
/// [`BundledScript`] submitted with `inventory::submit!`.
#[derive(Debug, Clone, Default)]
pub struct BundledHost {
    resources: BTreeMap<String, Cow<'static, str>>,
    root: Option<PathBuf>,
}

impl BundledHost {
    /// Create a host with no resources and no filesystem root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource while building the host.
    pub fn with_resource(
        mut self,
        path: impl Into<String>,
        source: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.insert(path, source);
        self
    }

    /// Give the host a filesystem root for `dir:` locations.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Add or replace a resource.
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<Cow<'static, str>>) {
        self.resources.insert(path.into(), source.into());
    }

    /// Number of bundled resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if nothing is bundled.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// A host holding every statically submitted [`BundledScript`].
    #[cfg(feature = "inventory")]
    pub fn collected() -> Self {
        let mut host = Self::new();
        for script in inventory::iter::<BundledScript>() {
            host.insert(script.path, script.source);
        }
        host
    }
}

impl HostEnvironment for BundledHost {
    fn real_path(&self, path: &str) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(path.trim_start_matches('/')))
    }

    fn resource_paths(&self, prefix: &str) -> io::Result<Vec<String>> {
        let base = directory_prefix(prefix);
        let mut listed = BTreeSet::new();
        for path in self.resources.keys() {
            let Some(rest) = path.strip_prefix(&*base) else {
                continue;
            };
            match rest.find('/') {
                Some(end) => listed.insert(format!("{base}{}/", &rest[..end])),
                None if rest.is_empty() => false,
                None => listed.insert(path.clone()),
            };
        }
        if listed.is_empty() {
            return Err(io::Error::new(io::ErrorKind::NotFound, base.into_owned()));
        }
        Ok(listed.into_iter().collect())
    }

    fn resource(&self, path: &str) -> io::Result<String> {
        self.resources
            .get(path)
            .map(|source| source.to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_owned()))
    }
}

/// A script compiled into the binary.
///
/// ```rust,ignore
/// inventory::submit! {
///     BundledScript {
///         path: "/WEB-INF/scripts/checkout.rhai",
///         source: include_str!("../scripts/checkout.rhai"),
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BundledScript {
    /// Resource path the script is listed under.
    pub path: &'static str,
    /// Script source.
    pub source: &'static str,
}

#[cfg(feature = "inventory")]
inventory::collect!(BundledScript);
