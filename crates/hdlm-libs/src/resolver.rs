//! Transitive library resolution.
//!
//! Each installed library may carry its own manifest at
//! `<lib>/.hdlm/libraries.toml`. Resolution walks the workspace manifest
//! depth-first through those nested manifests and returns every library
//! dependency-first. Libraries first named in a nested manifest resolve to
//! the shared libs directory; the workspace manifest wins when both declare
//! the same name.

use std::collections::BTreeMap;

use hdlm_fs::WorkspaceLayout;
use hdlm_graph::WalkError;

use crate::{
    Error, LibraryManager, LibraryManifest, LibrarySpec, ResolvedLibrary, Result, SourceControl,
};

/// How far resolution may look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Only installed libraries contribute edges.
    #[default]
    InstalledOnly,
    /// Install each library before reading its nested manifest.
    FetchMissing,
}

pub struct DependencyResolver<'a, S> {
    manager: &'a LibraryManager<S>,
    mode: ResolveMode,
}

impl<'a, S: SourceControl> DependencyResolver<'a, S> {
    pub fn new(manager: &'a LibraryManager<S>) -> Self {
        Self {
            manager,
            mode: ResolveMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Every library reachable from the workspace manifest, dependencies
    /// before dependents.
    pub fn resolve_all(&self) -> Result<Vec<ResolvedLibrary>> {
        let manifest = self.manager.manifest()?;
        let roots = manifest.names();
        let mut specs = manifest.libraries;

        let order = hdlm_graph::walk(&roots, |name| self.dependencies_of(name, &mut specs))
            .map_err(|e| match e {
                WalkError::Cycle(cycle) => Error::CircularDependency(cycle),
                WalkError::Expand(e) => e,
            })?;

        tracing::debug!(libraries = ?order, mode = ?self.mode, "resolved library order");
        order
            .into_iter()
            .map(|name| {
                let spec = specs.remove(&name).ok_or_else(|| Error::UnknownLibrary {
                    name: name.clone(),
                    available: roots.clone(),
                })?;
                let dir = self.manager.layout().library_dir(&name);
                Ok(ResolvedLibrary::new(name, spec, dir))
            })
            .collect()
    }

    fn dependencies_of(
        &self,
        name: &str,
        specs: &mut BTreeMap<String, LibrarySpec>,
    ) -> Result<Vec<String>> {
        let dir = self.manager.layout().library_dir(name);
        if !dir.is_dir() {
            match self.mode {
                ResolveMode::InstalledOnly => return Ok(Vec::new()),
                ResolveMode::FetchMissing => {
                    let spec = specs.get(name).cloned().ok_or_else(|| Error::UnknownLibrary {
                        name: name.to_string(),
                        available: specs.keys().cloned().collect(),
                    })?;
                    self.manager.install_spec(name, &spec)?;
                }
            }
        }

        let nested = WorkspaceLayout::nested_manifest(&dir);
        if !nested.is_file() {
            return Ok(Vec::new());
        }
        let nested = LibraryManifest::load(&nested)?;

        let mut dependencies = Vec::with_capacity(nested.libraries.len());
        for (dependency, spec) in nested.libraries {
            specs.entry(dependency.clone()).or_insert(spec);
            dependencies.push(dependency);
        }
        tracing::debug!(library = %name, dependencies = ?dependencies, "read nested manifest");
        Ok(dependencies)
    }
}
