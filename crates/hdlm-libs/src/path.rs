//! `@lib/relative/path` source references.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static LIBRARY_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([a-zA-Z0-9_-]+)/(.+)$").unwrap());

/// A source reference into an installed library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPath {
    pub library: String,
    pub relative: String,
}

impl LibraryPath {
    /// Parse `@name/rest`; anything else is `None`.
    pub fn parse(reference: &str) -> Option<Self> {
        let captures = LIBRARY_PATH.captures(reference)?;
        Some(Self {
            library: captures[1].to_string(),
            relative: captures[2].to_string(),
        })
    }

    /// Whether `reference` looks like a library reference at all.
    pub fn is_library_reference(reference: &str) -> bool {
        reference.starts_with('@')
    }

    /// Like [`parse`](Self::parse), but a malformed `@` reference is an error.
    pub fn parse_strict(reference: &str) -> Result<Self> {
        Self::parse(reference).ok_or_else(|| Error::InvalidLibraryPath {
            path: reference.to_string(),
        })
    }

    /// Absolute path inside `libs_dir`; the library must be installed.
    ///
    /// The relative part may not leave the library directory: `..`, absolute
    /// and prefixed components are rejected.
    pub fn resolve(&self, libs_dir: &Path) -> Result<PathBuf> {
        let escapes = Path::new(&self.relative)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::InvalidLibraryPath {
                path: format!("@{}/{}", self.library, self.relative),
            });
        }
        let root = library_root(libs_dir, &self.library)?;
        Ok(root.join(&self.relative))
    }
}

/// Install directory of an installed library.
pub fn library_root(libs_dir: &Path, name: &str) -> Result<PathBuf> {
    let root = libs_dir.join(name);
    if !root.is_dir() {
        return Err(Error::NotInstalled {
            name: name.to_string(),
        });
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("@axi/rtl/axi_pkg.sv", "axi", "rtl/axi_pkg.sv")]
    #[case("@my-lib_2/a.sv", "my-lib_2", "a.sv")]
    fn test_parse(#[case] input: &str, #[case] library: &str, #[case] relative: &str) {
        let parsed = LibraryPath::parse(input).unwrap();
        assert_eq!(parsed.library, library);
        assert_eq!(parsed.relative, relative);
    }

    #[rstest]
    #[case("rtl/a.sv")]
    #[case("@axi")]
    #[case("@axi/")]
    #[case("@a.b/c.sv")]
    fn test_not_a_library_path(#[case] input: &str) {
        assert!(LibraryPath::parse(input).is_none());
    }

    #[test]
    fn test_strict_parse_names_reference() {
        let err = LibraryPath::parse_strict("@bad").unwrap_err();
        assert_eq!(err.to_string(), "Invalid library path format: @bad");
    }

    #[test]
    fn test_resolve_requires_installed_library() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = LibraryPath::parse("@axi/rtl/a.sv").unwrap();

        let err = path.resolve(temp.path()).unwrap_err();
        assert!(err.to_string().contains("hdlm lib install"));

        std::fs::create_dir(temp.path().join("axi")).unwrap();
        assert_eq!(path.resolve(temp.path()).unwrap(), temp.path().join("axi/rtl/a.sv"));
    }

    #[rstest]
    #[case("@axi/../../x.sv")]
    #[case("@axi/rtl/../../uart/a.sv")]
    #[case("@axi//etc/passwd")]
    fn test_resolve_rejects_paths_leaving_the_library(#[case] input: &str) {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("axi")).unwrap();

        let err = LibraryPath::parse(input).unwrap().resolve(temp.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidLibraryPath { .. }), "{err}");
    }
}
