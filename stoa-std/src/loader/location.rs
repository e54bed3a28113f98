//! Script location descriptors.

use std::{fmt, str::FromStr};
use stoa_core::LoadError;

/// Descriptor prefix selecting a filesystem directory.
pub const DIRECTORY_SCHEME: &str = "dir:";

/// Where handler scripts are loaded from.
///
/// Descriptors starting with `dir:` name a directory relative to the host's
/// real root; anything else is a packaged resource prefix resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScriptLocation {
    /// A filesystem directory, relative to the host root.
    Directory(String),
    /// A packaged resource prefix.
    Resource(String),
}

impl ScriptLocation {
    /// Parse a location descriptor.
    pub fn parse(descriptor: &str) -> Result<Self, LoadError> {
        let descriptor = descriptor.trim();
        match descriptor.strip_prefix(DIRECTORY_SCHEME) {
            Some("") => Err(LoadError::InvalidLocation(descriptor.to_owned())),
            Some(path) => Ok(Self::Directory(path.to_owned())),
            None if descriptor.is_empty() => Err(LoadError::InvalidLocation(descriptor.to_owned())),
            None => Ok(Self::Resource(descriptor.to_owned())),
        }
    }

    /// The path or prefix, without the scheme.
    pub fn path(&self) -> &str {
        match self {
            Self::Directory(path) | Self::Resource(path) => path,
        }
    }
}

impl FromStr for ScriptLocation {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScriptLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(path) => write!(f, "{DIRECTORY_SCHEME}{path}"),
            Self::Resource(prefix) => f.write_str(prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(
            ScriptLocation::parse("dir:WEB-INF/scripts/").unwrap(),
            ScriptLocation::Directory("WEB-INF/scripts/".into())
        );
        assert_eq!(
            "/WEB-INF/classes/scripts/".parse::<ScriptLocation>().unwrap(),
            ScriptLocation::Resource("/WEB-INF/classes/scripts/".into())
        );
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            ScriptLocation::parse("  "),
            Err(LoadError::InvalidLocation(_))
        ));
        assert!(matches!(
            ScriptLocation::parse("dir:"),
            Err(LoadError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_display_restores_descriptor() {
        let location = ScriptLocation::parse("dir:handlers/").unwrap();
        assert_eq!(location.to_string(), "dir:handlers/");
        assert_eq!(location.path(), "handlers/");
    }
}
