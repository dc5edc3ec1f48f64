//! The library manifest, `.hdlm/libraries.toml`.
//!
//! [`LibraryManifest`] is the typed view used for reading. Writes that add or
//! remove a single entry go through [`ManifestEditor`], which edits the
//! existing document so comments and layout survive.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml_edit::{DocumentMut, Item, Table, value};

use crate::{Error, LibrarySpec, Result};

/// Manifest format version written to `[hdlm]`.
pub const MANIFEST_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestMeta {
    pub version: String,
}

impl Default for ManifestMeta {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryManifest {
    #[serde(default)]
    pub hdlm: ManifestMeta,
    #[serde(default)]
    pub libraries: BTreeMap<String, LibrarySpec>,
}

impl LibraryManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest; a missing file is an empty manifest.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no library manifest, using empty manifest");
            return Ok(Self::default());
        }
        let content = hdlm_fs::io::read_text(path)?;
        Self::parse(path, &content)
    }

    /// Parse manifest text; `path` is used only for error messages.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ManifestParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::InvalidSpec {
            message: e.to_string(),
        })
    }

    /// Write the whole manifest atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        hdlm_fs::io::write_text(path, &self.to_toml_string()?)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&LibrarySpec> {
        self.libraries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.libraries.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Look up `name`, listing the declared libraries on failure.
    pub fn require(&self, name: &str) -> Result<&LibrarySpec> {
        self.get(name).ok_or_else(|| Error::UnknownLibrary {
            name: name.to_string(),
            available: self.names(),
        })
    }
}

/// Format-preserving editor for a manifest file.
#[derive(Debug)]
pub struct ManifestEditor {
    path: PathBuf,
    doc: DocumentMut,
}

impl ManifestEditor {
    /// Open `path` for editing, starting a fresh document if it is missing.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = if path.exists() {
            let content = hdlm_fs::io::read_text(path)?;
            content
                .parse::<DocumentMut>()
                .map_err(|e: toml_edit::TomlError| Error::ManifestParse {
                    path: path.to_path_buf(),
                    message: e.message().to_string(),
                })?
        } else {
            let mut doc = DocumentMut::new();
            let mut meta = Table::new();
            meta.insert("version", value(MANIFEST_VERSION));
            doc.insert("hdlm", Item::Table(meta));
            doc
        };
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    fn libraries_mut(&mut self) -> Result<&mut Table> {
        let item = self
            .doc
            .entry("libraries")
            .or_insert_with(|| Item::Table(Table::new()));
        item.as_table_mut().ok_or_else(|| Error::ManifestParse {
            path: self.path.clone(),
            message: "'libraries' must be a table".to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.doc
            .get("libraries")
            .and_then(Item::as_table)
            .is_some_and(|t| t.contains_key(name))
    }

    /// Append a `[libraries.<name>]` table; existing names are rejected.
    pub fn add(&mut self, name: &str, spec: &LibrarySpec) -> Result<()> {
        if self.contains(name) {
            return Err(Error::DuplicateLibrary {
                name: name.to_string(),
            });
        }
        let libraries = self.libraries_mut()?;
        libraries.set_implicit(true);

        let mut entry = Table::new();
        entry.insert("git", value(spec.git()));
        let selector = spec.selector();
        entry.insert(selector.kind(), value(selector.value()));
        libraries.insert(name, Item::Table(entry));
        Ok(())
    }

    /// Remove the `[libraries.<name>]` table; returns whether it existed.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        if !self.contains(name) {
            return Ok(false);
        }
        Ok(self.libraries_mut()?.remove(name).is_some())
    }

    pub fn to_toml_string(&self) -> String {
        self.doc.to_string()
    }

    pub fn save(&self) -> Result<()> {
        hdlm_fs::io::write_text(&self.path, &self.doc.to_string())?;
        Ok(())
    }
}
