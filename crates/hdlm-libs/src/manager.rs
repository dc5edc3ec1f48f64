//! Installing, updating and editing the libraries of one workspace.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use hdlm_fs::WorkspaceLayout;

use crate::path::library_root;
use crate::{
    Error, Git2Backend, LibraryManifest, LibraryPath, LibrarySpec, ManifestEditor,
    ResolvedLibrary, Result, SourceControl, VersionSelector,
};

/// Outcome of [`LibraryManager::install_all`]: failures do not stop the batch.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: Vec<ResolvedLibrary>,
    pub failed: Vec<(String, Error)>,
}

impl InstallReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Library operations against a workspace's manifest and libs directory.
#[derive(Debug)]
pub struct LibraryManager<S = Git2Backend> {
    layout: WorkspaceLayout,
    scm: S,
}

impl LibraryManager<Git2Backend> {
    pub fn new(layout: WorkspaceLayout) -> Self {
        Self::with_backend(layout, Git2Backend)
    }
}

impl<S: SourceControl> LibraryManager<S> {
    pub fn with_backend(layout: WorkspaceLayout, scm: S) -> Self {
        Self { layout, scm }
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn backend(&self) -> &S {
        &self.scm
    }

    /// The workspace manifest (empty if the file does not exist).
    pub fn manifest(&self) -> Result<LibraryManifest> {
        LibraryManifest::load(&self.layout.manifest_path())
    }

    /// Declared libraries, by name.
    pub fn list(&self) -> Result<BTreeMap<String, LibrarySpec>> {
        Ok(self.manifest()?.libraries)
    }

    /// Declare a new library. The name defaults to the last URL segment
    /// without `.git`.
    pub fn add(&self, url: &str, selector: VersionSelector, name: Option<&str>) -> Result<String> {
        let name = match name {
            Some(name) => name.to_string(),
            None => derive_name(url),
        };
        validate_name(&name)?;

        let mut editor = ManifestEditor::open(&self.layout.manifest_path())?;
        editor.add(&name, &LibrarySpec::new(url, selector))?;
        editor.save()?;

        tracing::info!(library = %name, url = %url, "added library to manifest");
        Ok(name)
    }

    /// Drop a library from the manifest and delete its checkout.
    pub fn remove(&self, name: &str) -> Result<()> {
        let manifest_path = self.layout.manifest_path();
        let mut editor = ManifestEditor::open(&manifest_path)?;
        if !editor.remove(name)? {
            return Err(Error::UnknownLibrary {
                name: name.to_string(),
                available: self.manifest()?.names(),
            });
        }
        editor.save()?;
        tracing::info!(library = %name, "removed library from manifest");

        let dir = self.layout.library_dir(name);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| hdlm_fs::Error::io(&dir, e))?;
            tracing::info!(library = %name, path = %dir.display(), "removed library checkout");
        }
        Ok(())
    }

    /// Install one declared library.
    pub fn install(&self, name: &str) -> Result<ResolvedLibrary> {
        let manifest = self.manifest()?;
        let spec = manifest.require(name)?;
        self.install_spec(name, spec)
    }

    /// Install every declared library, continuing past failures.
    pub fn install_all(&self) -> Result<InstallReport> {
        let manifest = self.manifest()?;
        let mut report = InstallReport::default();

        for (name, spec) in &manifest.libraries {
            match self.install_spec(name, spec) {
                Ok(library) => report.installed.push(library),
                Err(e) => {
                    tracing::error!(library = %name, error = %e, "failed to install library");
                    report.failed.push((name.clone(), e));
                }
            }
        }
        Ok(report)
    }

    /// Clone (if absent) and check out the pinned reference.
    pub fn install_spec(&self, name: &str, spec: &LibrarySpec) -> Result<ResolvedLibrary> {
        let libs = self.layout.libs_dir();
        fs::create_dir_all(&libs).map_err(|e| hdlm_fs::Error::io(&libs, e))?;

        let dir = self.layout.library_dir(name);
        if !dir.exists() {
            self.scm.clone_repo(spec.git(), &dir)?;
        }
        self.scm.checkout(&dir, spec.selector())?;

        tracing::info!(library = %name, version = %spec.selector(), "installed library");
        Ok(ResolvedLibrary::new(name, spec.clone(), dir))
    }

    /// Re-fetch and re-check-out installed libraries: `name`, or all of them.
    ///
    /// Entries that are not installed are skipped. A failing library is
    /// logged and left out of the returned names.
    pub fn update(&self, name: Option<&str>) -> Result<Vec<String>> {
        let manifest = self.manifest()?;
        let selected: Vec<(&String, &LibrarySpec)> = match name {
            Some(name) => {
                manifest.require(name)?;
                manifest
                    .libraries
                    .iter()
                    .filter(|(n, _)| n.as_str() == name)
                    .collect()
            }
            None => manifest.libraries.iter().collect(),
        };

        let mut updated = Vec::new();
        for (name, spec) in selected {
            let dir = self.layout.library_dir(name);
            if !dir.exists() {
                tracing::debug!(library = %name, "library not installed, skipping update");
                continue;
            }
            let result = self
                .scm
                .fetch(&dir)
                .and_then(|()| self.scm.checkout(&dir, spec.selector()));
            match result {
                Ok(()) => {
                    tracing::info!(library = %name, version = %spec.selector(), "updated library");
                    updated.push(name.clone());
                }
                Err(e) => tracing::warn!(library = %name, error = %e, "failed to update library"),
            }
        }
        Ok(updated)
    }

    /// Declared libraries whose install directory exists.
    pub fn installed(&self) -> Result<Vec<ResolvedLibrary>> {
        Ok(self
            .manifest()?
            .libraries
            .into_iter()
            .filter_map(|(name, spec)| {
                let dir = self.layout.library_dir(&name);
                dir.is_dir().then(|| ResolvedLibrary::new(name, spec, dir))
            })
            .collect())
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.layout.library_dir(name).is_dir()
    }

    /// Absolute path of an `@lib/path` reference.
    pub fn resolve_reference(&self, reference: &LibraryPath) -> Result<PathBuf> {
        reference.resolve(&self.layout.libs_dir())
    }

    /// Install directory of an installed library.
    pub fn library_root(&self, name: &str) -> Result<PathBuf> {
        library_root(&self.layout.libs_dir(), name)
    }
}

/// Library name implied by a clone URL.
///
/// `https://host/user/my-lib.git` gives `my-lib`; `git@host:user/lib.git`
/// gives `lib`.
pub fn derive_name(url: &str) -> String {
    let url = url.trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);
    let path = match url.rsplit_once(':') {
        Some((_, rest)) if !url.starts_with("http") && !url.contains("://") => rest,
        _ => url,
    };
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
            reason: "use letters, digits, '-' and '_' only".to_string(),
        })
    }
}
