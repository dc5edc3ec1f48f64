//! Library dependencies for hdlm
//!
//! A library is a git repository pinned to exactly one tag, branch or commit,
//! declared in the workspace manifest (`.hdlm/libraries.toml`) and installed
//! under `.hdlm/libs/<name>`. Sources reference files inside an installed
//! library as `@name/relative/path`.
//!
//! # Example
//!
//! ```toml
//! [hdlm]
//! version = "1.0"
//!
//! [libraries.axi]
//! git = "https://github.com/user/axi.git"
//! tag = "v1.2.0"
//! ```

pub mod error;
pub mod git;
pub mod manager;
pub mod manifest;
pub mod path;
pub mod resolver;
pub mod spec;

pub use error::{Error, Result};
pub use git::{Git2Backend, SourceControl};
pub use manager::{InstallReport, LibraryManager, derive_name};
pub use manifest::{LibraryManifest, MANIFEST_VERSION, ManifestEditor};
pub use path::LibraryPath;
pub use resolver::{DependencyResolver, ResolveMode};
pub use spec::{LibrarySpec, ResolvedLibrary, VersionSelector};
