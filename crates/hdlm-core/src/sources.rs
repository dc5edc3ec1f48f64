//! Source files and include directories of a module.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use hdlm_fs::WorkspaceLayout;
use hdlm_libs::LibraryPath;
use hdlm_meta::ModuleConfig;
use serde::Serialize;

/// Suffixes of resources treated as headers.
const HEADER_SUFFIXES: &[&str] = &["vh", "svh", "h"];

/// Directories of a library added to the include path when present.
const LIBRARY_INCLUDE_DIRS: &[&str] = &["include", "inc", "rtl", "src"];

/// Resolved sources of one module, composed descriptions included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceSet {
    /// Compilation order: composed descriptions first, then packages, then
    /// modules.
    pub files: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    /// Libraries referenced through `@lib/path`.
    pub libraries: BTreeSet<String>,
    /// References that did not resolve to an existing file.
    pub missing: Vec<String>,
}

impl SourceSet {
    fn push_file(&mut self, path: PathBuf) {
        if !self.files.contains(&path) {
            self.files.push(path);
        }
    }

    fn push_include(&mut self, dir: PathBuf) {
        if dir.is_dir() && !self.include_dirs.contains(&dir) {
            self.include_dirs.push(dir);
        }
    }
}

/// Resolves local and `@lib` source references.
#[derive(Debug, Clone, Default)]
pub struct SourceResolver {
    libs_dir: Option<PathBuf>,
}

impl SourceResolver {
    /// Resolver for a module outside any workspace: `@lib` references are
    /// reported missing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_libs_dir(libs_dir: impl Into<PathBuf>) -> Self {
        Self {
            libs_dir: Some(libs_dir.into()),
        }
    }

    pub fn for_workspace(layout: &WorkspaceLayout) -> Self {
        Self::with_libs_dir(layout.libs_dir())
    }

    /// Resolve one reference against `base_dir`. `None` when an `@lib`
    /// reference cannot be resolved.
    pub fn resolve_reference(&self, reference: &str, base_dir: &Path) -> Option<PathBuf> {
        if LibraryPath::is_library_reference(reference) {
            let libs_dir = self.libs_dir.as_deref()?;
            return match LibraryPath::parse_strict(reference).and_then(|p| p.resolve(libs_dir)) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(reference = %reference, error = %e, "failed to resolve library path");
                    None
                }
            };
        }
        let path = Path::new(reference);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        })
    }

    /// Resolve every source of `config` and its composed descriptions.
    pub fn resolve(&self, config: &ModuleConfig) -> SourceSet {
        let mut set = SourceSet::default();
        self.collect(config, &mut set);

        let libraries = set.libraries.clone();
        for library in &libraries {
            let Some(root) = self.libs_dir.as_deref().map(|d| d.join(library)) else {
                continue;
            };
            for dir in LIBRARY_INCLUDE_DIRS {
                set.push_include(root.join(dir));
            }
        }

        if !set.missing.is_empty() {
            tracing::warn!(
                module = %config.name,
                count = set.missing.len(),
                missing = ?set.missing,
                "source files not found"
            );
        }
        set
    }

    fn collect(&self, config: &ModuleConfig, set: &mut SourceSet) {
        for composed in &config.composed {
            self.collect(composed, set);
        }

        let sources = &config.sources;
        for reference in sources.packages.iter().chain(&sources.modules) {
            self.note_library(reference, set);
            match self.existing(reference, &config.base_dir) {
                Some(path) => set.push_file(path),
                None => set.missing.push(reference.clone()),
            }
        }

        for reference in &sources.includes {
            self.note_library(reference, set);
            if let Some(path) = self.resolve_reference(reference, &config.base_dir) {
                let dir = if path.is_dir() {
                    path
                } else {
                    path.parent().map(Path::to_path_buf).unwrap_or(path)
                };
                set.push_include(normalize(dir));
            }
        }

        for reference in &sources.resources {
            let Some(path) = self.resolve_reference(reference, &config.base_dir) else {
                continue;
            };
            let is_header = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| HEADER_SUFFIXES.contains(&e));
            if is_header && let Some(parent) = path.parent() {
                set.push_include(normalize(parent.to_path_buf()));
            }
        }
    }

    fn note_library(&self, reference: &str, set: &mut SourceSet) {
        if let Some(path) = LibraryPath::parse(reference) {
            set.libraries.insert(path.library);
        }
    }

    fn existing(&self, reference: &str, base_dir: &Path) -> Option<PathBuf> {
        let path = self.resolve_reference(reference, base_dir)?;
        path.exists().then(|| normalize(path))
    }
}

fn normalize(path: PathBuf) -> PathBuf {
    dunce::canonicalize(&path).unwrap_or(path)
}
