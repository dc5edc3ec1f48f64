//! Library specifications and resolved libraries.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The one reference a library is pinned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSelector {
    Tag(String),
    Branch(String),
    Commit(String),
}

impl VersionSelector {
    /// `tag`, `branch` or `commit`; also the manifest key.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tag(_) => "tag",
            Self::Branch(_) => "branch",
            Self::Commit(_) => "commit",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Tag(v) | Self::Branch(v) | Self::Commit(v) => v,
        }
    }

    /// Revision to check out in a clone: `tags/<tag>`, `origin/<branch>`, or
    /// the commit itself.
    pub fn revision(&self) -> String {
        match self {
            Self::Tag(tag) => format!("tags/{tag}"),
            Self::Branch(branch) => format!("origin/{branch}"),
            Self::Commit(commit) => commit.clone(),
        }
    }

    /// Build from optional manifest fields; exactly one must be set.
    pub fn from_fields(
        tag: Option<String>,
        branch: Option<String>,
        commit: Option<String>,
    ) -> Result<Self> {
        match (tag, branch, commit) {
            (Some(tag), None, None) => Ok(Self::Tag(tag)),
            (None, Some(branch), None) => Ok(Self::Branch(branch)),
            (None, None, Some(commit)) => Ok(Self::Commit(commit)),
            (None, None, None) => Err(Error::InvalidSpec {
                message: "one of 'tag', 'branch', or 'commit' must be specified for library"
                    .to_string(),
            }),
            _ => Err(Error::InvalidSpec {
                message: "only one of 'tag', 'branch', or 'commit' can be specified".to_string(),
            }),
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.value())
    }
}

/// A library entry: fetch URL plus exactly one version selector.
///
/// The selector is an enum, so an invalid combination cannot be constructed;
/// deserialization goes through [`VersionSelector::from_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSpec", into = "RawSpec")]
pub struct LibrarySpec {
    git: String,
    selector: VersionSelector,
}

impl LibrarySpec {
    pub fn new(git: impl Into<String>, selector: VersionSelector) -> Self {
        Self {
            git: git.into(),
            selector,
        }
    }

    pub fn git(&self) -> &str {
        &self.git
    }

    pub fn selector(&self) -> &VersionSelector {
        &self.selector
    }
}

/// On-disk shape: one selector field, absent ones omitted.
#[derive(Serialize, Deserialize)]
struct RawSpec {
    git: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    commit: Option<String>,
}

impl TryFrom<RawSpec> for LibrarySpec {
    type Error = Error;

    fn try_from(raw: RawSpec) -> Result<Self> {
        let selector = VersionSelector::from_fields(raw.tag, raw.branch, raw.commit)?;
        Ok(Self::new(raw.git, selector))
    }
}

impl From<LibrarySpec> for RawSpec {
    fn from(spec: LibrarySpec) -> Self {
        let mut raw = RawSpec {
            git: spec.git,
            tag: None,
            branch: None,
            commit: None,
        };
        match spec.selector {
            VersionSelector::Tag(v) => raw.tag = Some(v),
            VersionSelector::Branch(v) => raw.branch = Some(v),
            VersionSelector::Commit(v) => raw.commit = Some(v),
        }
        raw
    }
}

/// A library bound to its name and install directory.
///
/// Only installation and resolution produce these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLibrary {
    name: String,
    spec: LibrarySpec,
    path: PathBuf,
}

impl ResolvedLibrary {
    pub(crate) fn new(name: impl Into<String>, spec: LibrarySpec, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            spec,
            path,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &LibrarySpec {
        &self.spec
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_installed(&self) -> bool {
        self.path.is_dir()
    }
}
