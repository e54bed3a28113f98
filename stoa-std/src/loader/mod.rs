//! Handler script loading.
//!
//! At startup the host points a [`ScriptLoader`] at a [`ScriptLocation`] and a
//! [`ScriptEngine`]. The loader enumerates the location (one level deep, sorted
//! by name), reads each source unit, and hands it to the engine. Each unit is
//! loaded at most once per loader; the first failure aborts the rest.
//!
//! ```rust,ignore
//! let mut loader = ScriptLoader::new(LoaderConfig::default().extension("rhai"));
//! loader.load_all("dir:WEB-INF/scripts/", &DirectoryHost::new(webapp_root), &mut engine)?;
//! ```

mod host;
mod location;

pub use host::{BundledHost, BundledScript, DirectoryHost, HostEnvironment};
pub use location::{DIRECTORY_SCHEME, ScriptLocation};

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};
use stoa_core::{BoxError, LoadError};
use walkdir::WalkDir;

/// Where a source unit was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOrigin {
    /// A file on disk.
    File(PathBuf),
    /// A packaged resource path.
    Resource(String),
}

/// One handler script, ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Load name. Units are deduplicated by this name.
    pub name: String,
    /// Where the source came from.
    pub origin: UnitOrigin,
    /// Script source text.
    pub source: String,
}

/// Turns source units into loaded handler definitions.
pub trait ScriptEngine {
    /// Load one unit. An error aborts the remaining loads.
    fn load(&mut self, unit: &SourceUnit) -> Result<(), BoxError>;
}

// Blanket impl for closures
impl<F> ScriptEngine for F
where
    F: FnMut(&SourceUnit) -> Result<(), BoxError>,
{
    fn load(&mut self, unit: &SourceUnit) -> Result<(), BoxError> {
        (self)(unit)
    }
}

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    extensions: Vec<String>,
    load_root: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            load_root: "scripts/".to_owned(),
        }
    }
}

impl LoaderConfig {
    /// Only load files with this extension. May be given several times; with
    /// none configured every regular file is a unit.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extensions
            .push(extension.trim_start_matches('.').to_owned());
        self
    }

    /// Prefix substituted for the resource prefix in unit names.
    pub fn load_root(mut self, root: impl Into<String>) -> Self {
        self.load_root = root.into();
        self
    }

    /// Returns `true` if `path` passes the extension filter.
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}

/// Loads handler scripts into a [`ScriptEngine`].
#[derive(Debug, Default)]
pub struct ScriptLoader {
    config: LoaderConfig,
    loaded: HashSet<String>,
}

impl ScriptLoader {
    /// Create a loader with `config`.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            loaded: HashSet::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Returns `true` if a unit with this name has been loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    /// Number of units loaded so far.
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Parse `descriptor` and load every unit under it.
    ///
    /// Returns the number of units loaded by this call.
    pub fn load_all<H, G>(
        &mut self,
        descriptor: &str,
        env: &H,
        engine: &mut G,
    ) -> Result<usize, LoadError>
    where
        H: HostEnvironment + ?Sized,
        G: ScriptEngine + ?Sized,
    {
        let location = ScriptLocation::parse(descriptor)?;
        self.load_location(&location, env, engine)
    }

    /// Load every unit under `location`.
    pub fn load_location<H, G>(
        &mut self,
        location: &ScriptLocation,
        env: &H,
        engine: &mut G,
    ) -> Result<usize, LoadError>
    where
        H: HostEnvironment + ?Sized,
        G: ScriptEngine + ?Sized,
    {
        let result = match location {
            ScriptLocation::Directory(path) => self.load_directory(path, env, engine),
            ScriptLocation::Resource(prefix) => self.load_resources(prefix, env, engine),
        };

        #[cfg(feature = "tracing")]
        match &result {
            Ok(count) => tracing::info!(%location, loaded = *count, "handler scripts loaded"),
            Err(err) => tracing::warn!(%location, error = %err, "handler script loading aborted"),
        }
        result
    }

    fn load_directory<H, G>(
        &mut self,
        path: &str,
        env: &H,
        engine: &mut G,
    ) -> Result<usize, LoadError>
    where
        H: HostEnvironment + ?Sized,
        G: ScriptEngine + ?Sized,
    {
        let root = env
            .real_path("/")
            .ok_or_else(|| LoadError::MissingRoot("/".to_owned()))?;
        let dir = root.join(path.trim_start_matches('/'));

        let mut count = 0;
        let entries = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        for entry in entries {
            let entry = entry.map_err(|err| LoadError::Io {
                path: err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| dir.clone()),
                source: io::Error::from(err),
            })?;
            if !entry.file_type().is_file() || !self.config.accepts(entry.path()) {
                continue;
            }

            let file = entry.into_path();
            let name = file.to_string_lossy().into_owned();
            if self.loaded.contains(&name) {
                continue;
            }
            let source = fs::read_to_string(&file).map_err(|source| LoadError::Io {
                path: file.clone(),
                source,
            })?;
            self.load_unit(
                SourceUnit {
                    name,
                    origin: UnitOrigin::File(file),
                    source,
                },
                engine,
            )?;
            count += 1;
        }
        Ok(count)
    }

    fn load_resources<H, G>(
        &mut self,
        prefix: &str,
        env: &H,
        engine: &mut G,
    ) -> Result<usize, LoadError>
    where
        H: HostEnvironment + ?Sized,
        G: ScriptEngine + ?Sized,
    {
        let mut paths: Vec<String> = env
            .resource_paths(prefix)
            .map_err(|err| resource_error(prefix, err))?
            .into_iter()
            .filter(|path| !path.ends_with('/') && self.config.accepts(Path::new(path)))
            .collect();
        paths.sort();

        let mut count = 0;
        for path in paths {
            let name = match path.strip_prefix(prefix) {
                Some(rest) => {
                    format!("{}{}", self.config.load_root, rest.trim_start_matches('/'))
                }
                None => path.clone(),
            };
            if self.loaded.contains(&name) {
                continue;
            }
            let source = env
                .resource(&path)
                .map_err(|err| resource_error(&path, err))?;
            self.load_unit(
                SourceUnit {
                    name,
                    origin: UnitOrigin::Resource(path),
                    source,
                },
                engine,
            )?;
            count += 1;
        }
        Ok(count)
    }

    fn load_unit<G>(&mut self, unit: SourceUnit, engine: &mut G) -> Result<(), LoadError>
    where
        G: ScriptEngine + ?Sized,
    {
        engine.load(&unit).map_err(|source| LoadError::Engine {
            unit: unit.name.clone(),
            source,
        })?;
        debug!(unit = %unit.name, "loaded handler script");
        self.loaded.insert(unit.name);
        Ok(())
    }
}

fn resource_error(path: &str, err: io::Error) -> LoadError {
    match err.kind() {
        io::ErrorKind::NotFound => LoadError::MissingResource(path.to_owned()),
        _ => LoadError::Io {
            path: PathBuf::from(path),
            source: err,
        },
    }
}
